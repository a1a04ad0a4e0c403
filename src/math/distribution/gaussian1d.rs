//! 1-D Gaussian distribution.

use super::Sample1D;
use crate::math::{erf_lut, sqr, Float, Range, INV_SQRT_TWO, INV_SQRT_TWO_PI};
use crate::sampler::{Measure, Sampler};

/// Gaussian density. Correctly handles the singular case where the standard
/// deviation is 0 and the distribution becomes a Dirac.
#[derive(Copy, Clone, Debug)]
pub struct Gaussian1D {
    mu: Float,
    sigma: Float,
    recp_sigma: Float,
}

impl Gaussian1D {
    pub fn new(sigma: Float, mu: Float) -> Self {
        Self {
            mu,
            sigma,
            recp_sigma: 1.0 / sigma,
        }
    }

    /// The mean of the distribution.
    #[inline]
    pub fn mean(&self) -> Float {
        self.mu
    }

    /// The standard deviation of the distribution.
    #[inline]
    pub fn std_dev(&self) -> Float {
        self.sigma
    }

    /// Whether the distribution is degenerate (a Dirac delta).
    #[inline]
    pub fn is_dirac(&self) -> bool {
        self.sigma == 0.0
    }

    /// PDF of the distribution at `x`.
    pub fn pdf(&self, x: Float, measure: Measure) -> Float {
        if !self.is_dirac() {
            if measure == Measure::Continuous {
                INV_SQRT_TWO_PI * self.recp_sigma * (-sqr((x - self.mu) * self.recp_sigma) / 2.0).exp()
            } else {
                0.0
            }
        } else if x == self.mu && measure == Measure::Discrete {
            Float::INFINITY
        } else {
            0.0
        }
    }

    /// Samples a Gaussian-distributed point.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> Sample1D {
        if self.is_dirac() {
            return Sample1D {
                x: self.mu,
                measure: Measure::Discrete,
                pdf: 1.0,
            };
        }

        let pt = self.sigma * sampler.normal() + self.mu;
        Sample1D {
            x: pt,
            measure: Measure::Continuous,
            pdf: self.pdf(pt, Measure::Continuous),
        }
    }

    /// Integrates the distribution over a range.
    pub fn integrate(&self, r: &Range) -> Float {
        if self.is_dirac() {
            return if r.contains(self.mu) { 1.0 } else { 0.0 };
        }
        let n = INV_SQRT_TWO * self.recp_sigma;
        (erf_lut((r.max - self.mu) * n) - erf_lut((r.min - self.mu) * n)) / 2.0
    }

    /// Integrates this distribution against another Gaussian (the overlap
    /// integral ∫ f g).
    pub fn integrate_gaussian(&self, g: &Gaussian1D) -> Float {
        debug_assert!(!self.is_dirac() && !g.is_dirac());
        let recp_sigma2 = 1.0 / (sqr(self.sigma) + sqr(g.sigma));
        INV_SQRT_TWO_PI
            * recp_sigma2.sqrt()
            * if self.mu == g.mu {
                1.0
            } else {
                (-sqr(self.mu - g.mu) * recp_sigma2 / 2.0).exp()
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::UniformSampler;

    #[test]
    fn pdf_peak() {
        let g = Gaussian1D::new(2.0, 1.0);
        assert!((g.pdf(1.0, Measure::Continuous) - INV_SQRT_TWO_PI / 2.0).abs() < 1e-9);
        assert_eq!(g.pdf(1.0, Measure::Discrete), 0.0);
    }

    #[test]
    fn dirac_case() {
        let g = Gaussian1D::new(0.0, 3.0);
        assert!(g.is_dirac());
        assert_eq!(g.pdf(3.0, Measure::Continuous), 0.0);
        assert_eq!(g.pdf(3.0, Measure::Discrete), Float::INFINITY);
        let mut s = UniformSampler::new(0);
        let smp = g.sample(&mut s);
        assert_eq!(smp.x, 3.0);
        assert_eq!(smp.measure, Measure::Discrete);
        assert_eq!(smp.pdf, 1.0);
    }

    #[test]
    fn integrate_sigma_ranges() {
        let g = Gaussian1D::new(1.5, -2.0);
        assert!((g.integrate(&Range::all()) - 1.0).abs() < 1e-4);
        // one sigma on each side ≈ 68.3%
        let one = g.integrate(&Range::new(-3.5, -0.5));
        assert!((one - 0.6827).abs() < 1e-3, "one sigma {one}");
    }

    #[test]
    fn sample_moments() {
        let g = Gaussian1D::new(0.5, 4.0);
        let mut s = UniformSampler::new(2);
        let n = 100_000;
        let mut acc = 0.0;
        for _ in 0..n {
            acc += g.sample(&mut s).x;
        }
        assert!((acc / n as Float - 4.0).abs() < 0.01);
    }
}
