//! Continuous uniform distribution.

use super::Sample1D;
use crate::math::{mix, Float, Range};
use crate::sampler::{Measure, Sampler};

#[derive(Clone, Debug)]
pub struct UniformDistribution {
    range: Range,
    recp_range_length: Float,
}

impl UniformDistribution {
    /// Builds the distribution. An empty or zero-length range yields a
    /// degenerate distribution with zero density everywhere; products of
    /// disjoint uniforms produce these.
    pub fn new(range: Range) -> Self {
        let len = range.length();
        Self {
            range,
            recp_range_length: if len > 0.0 { 1.0 / len } else { 0.0 },
        }
    }

    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// PDF of the distribution at `x`. `1/(b−a)` inside the range, else 0.
    #[inline]
    pub fn pdf(&self, x: Float, measure: Measure) -> Float {
        if measure == Measure::Continuous && self.range.contains(x) {
            self.recp_range_length
        } else {
            0.0
        }
    }

    /// CDF.
    #[inline]
    pub fn cdf(&self, x: Float) -> Float {
        if x >= self.range.max {
            1.0
        } else if x <= self.range.min {
            0.0
        } else {
            (x - self.range.min) * self.recp_range_length
        }
    }

    /// Inverse CDF.
    #[inline]
    pub fn icdf(&self, v: Float) -> Float {
        debug_assert!(self.range.length().is_finite() && self.range.length() >= 0.0);
        mix(self.range.min, self.range.max, v)
    }

    /// Samples from the distribution.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> Sample1D {
        Sample1D {
            x: self.icdf(sampler.r()),
            measure: Measure::Continuous,
            pdf: self.recp_range_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::UniformSampler;

    #[test]
    fn pdf_inside_outside() {
        let d = UniformDistribution::new(Range::new(2.0, 6.0));
        assert_eq!(d.pdf(3.0, Measure::Continuous), 0.25);
        assert_eq!(d.pdf(7.0, Measure::Continuous), 0.0);
        assert_eq!(d.pdf(3.0, Measure::Discrete), 0.0);
    }

    #[test]
    fn unbiased_reciprocal_pdf() {
        // mean of 1/pdf over samples approaches the support length
        let d = UniformDistribution::new(Range::new(-1.0, 3.0));
        let mut s = UniformSampler::new(1);
        let n = 10_000;
        let mut acc = 0.0;
        for _ in 0..n {
            let smp = d.sample(&mut s);
            assert!(d.range().contains(smp.x));
            acc += 1.0 / smp.pdf;
        }
        assert!((acc / n as Float - 4.0).abs() < 1e-9);
    }
}
