//! Discrete distributions (sums of Dirac impulses).

use super::Sample1D;
use crate::math::{Float, Range, Vec2};
use crate::sampler::{Measure, Sampler};

/// Discrete distribution over atoms `(x, mass)` with `x` ascending.
#[derive(Clone, Debug)]
pub struct DiscreteDistribution {
    bins: Vec<Vec2>,
    dcdf: Vec<Float>,
    sum: Float,
    recp_sum: Float,
}

impl DiscreteDistribution {
    pub fn new(bins: Vec<Vec2>) -> Self {
        debug_assert!(!bins.is_empty());

        // accumulate
        let mut dcdf = vec![0.0; bins.len() + 1];
        for (i, b) in bins.iter().enumerate() {
            debug_assert!(b.y >= 0.0);
            dcdf[i + 1] = dcdf[i] + b.y.max(0.0);
        }

        // normalize
        let sum = *dcdf.last().unwrap();
        let recp_sum = if sum > 0.0 { 1.0 / sum } else { 0.0 };
        for c in dcdf.iter_mut() {
            *c *= recp_sum;
        }
        if sum == 0.0 {
            *dcdf.last_mut().unwrap() = 1.0;
        }

        Self {
            bins,
            dcdf,
            sum,
            recp_sum,
        }
    }

    /// Builds atoms from values and a value-to-mass functor.
    pub fn with_weights<F: Fn(Float) -> Float>(values: Vec<Float>, density: F) -> Self {
        let bins = values.iter().map(|&x| Vec2::new(x, density(x))).collect();
        Self::new(bins)
    }

    #[inline]
    pub fn total(&self) -> Float {
        self.sum
    }

    #[inline]
    pub fn range(&self) -> Range {
        Range::new(self.bins[0].x, self.bins[self.bins.len() - 1].x)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    #[inline]
    pub fn atom(&self, idx: usize) -> Vec2 {
        self.bins[idx]
    }

    #[inline]
    pub fn atoms(&self) -> &[Vec2] {
        &self.bins
    }

    /// Probability mass of the atom at index `idx`.
    #[inline]
    pub fn pdf_index(&self, idx: usize) -> Float {
        self.dcdf[idx + 1] - self.dcdf[idx]
    }

    /// CDF after the atom at index `idx`.
    #[inline]
    pub fn cdf_index(&self, idx: usize) -> Float {
        self.dcdf[idx + 1]
    }

    /// PDF at position `x`: the probability mass of an atom exactly at `x`
    /// under the discrete measure, 0 otherwise.
    pub fn pdf(&self, x: Float, measure: Measure) -> Float {
        if measure != Measure::Discrete {
            return 0.0;
        }
        let idx = self.bins.partition_point(|b| b.x < x);
        if idx == self.bins.len() || self.bins[idx].x != x {
            return 0.0;
        }
        self.pdf_index(idx)
    }

    /// CDF at position `x` (0 when no atom sits exactly at `x`).
    pub fn cdf(&self, x: Float) -> Float {
        let idx = self.bins.partition_point(|b| b.x < x);
        if idx == self.bins.len() || self.bins[idx].x != x {
            return 0.0;
        }
        self.dcdf[idx + 1]
    }

    /// Inverse CDF: lower-bound lookup, then skip zero-mass runs.
    pub fn icdf(&self, v: Float) -> Vec2 {
        let it = self.dcdf.partition_point(|c| *c < v);
        let mut idx = (it as isize - 1).clamp(0, self.bins.len() as isize - 1) as usize;
        while idx < self.bins.len() - 1 && self.dcdf[idx + 1] - self.dcdf[idx] == 0.0 {
            idx += 1;
        }
        self.bins[idx]
    }

    /// Samples an atom.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> Sample1D {
        let val = self.icdf(sampler.r());
        Sample1D {
            x: val.x,
            measure: Measure::Discrete,
            pdf: val.y * self.recp_sum,
        }
    }

    /// Histogram of atom masses over `bc` equal cells covering `range`.
    pub fn tabulate(&self, range: &Range, bc: usize) -> Vec<Float> {
        let mut tbl = vec![0.0; bc];
        for b in &self.bins {
            if range.contains(b.x) {
                let idx = ((b.x - range.min) / range.length() * bc as Float) as usize;
                tbl[idx.min(bc - 1)] += b.y;
            }
        }
        tbl
    }
}

/// Discrete distribution over indexed values with explicit weights; used
/// e.g. for importance-sampling emitters by power.
#[derive(Clone, Debug)]
pub struct IndexedDiscreteDistribution {
    dcdf: Vec<Float>,
}

impl IndexedDiscreteDistribution {
    pub fn new(weights: &[Float]) -> Self {
        let mut dcdf = vec![0.0; weights.len() + 1];
        for (i, w) in weights.iter().enumerate() {
            debug_assert!(*w >= 0.0);
            dcdf[i + 1] = dcdf[i] + w.max(0.0);
        }
        let sum = *dcdf.last().unwrap_or(&0.0);
        let recp = if sum > 0.0 { 1.0 / sum } else { 0.0 };
        for c in dcdf.iter_mut() {
            *c *= recp;
        }
        if sum == 0.0 {
            if let Some(l) = dcdf.last_mut() {
                *l = 1.0;
            }
        }
        Self { dcdf }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dcdf.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probability mass of index `idx`.
    #[inline]
    pub fn pdf(&self, idx: usize) -> Float {
        self.dcdf[idx + 1] - self.dcdf[idx]
    }

    /// Samples an index.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> usize {
        let v = sampler.r();
        let it = self.dcdf.partition_point(|c| *c < v);
        let mut idx = (it as isize - 1).clamp(0, self.len() as isize - 1) as usize;
        while idx < self.len() - 1 && self.dcdf[idx + 1] - self.dcdf[idx] == 0.0 {
            idx += 1;
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::UniformSampler;

    fn atoms() -> DiscreteDistribution {
        DiscreteDistribution::new(vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 3.0),
        ])
    }

    #[test]
    fn pdf_masses() {
        let d = atoms();
        assert!((d.pdf(1.0, Measure::Discrete) - 0.25).abs() < 1e-12);
        assert_eq!(d.pdf(2.0, Measure::Discrete), 0.0);
        assert!((d.pdf(3.0, Measure::Discrete) - 0.75).abs() < 1e-12);
        assert_eq!(d.pdf(1.5, Measure::Discrete), 0.0);
        assert_eq!(d.pdf(1.0, Measure::Continuous), 0.0);
    }

    #[test]
    fn icdf_skips_zero_mass_runs() {
        let d = atoms();
        assert_eq!(d.icdf(0.1).x, 1.0);
        // just past the first atom's mass: must skip the zero-mass atom
        assert_eq!(d.icdf(0.26).x, 3.0);
        assert_eq!(d.icdf(1.0).x, 3.0);
    }

    #[test]
    fn sampling_frequencies_match_masses() {
        // L1 distance between empirical frequencies and masses shrinks
        let d = atoms();
        let mut s = UniformSampler::new(5);
        let n = 100_000;
        let mut c1 = 0usize;
        let mut c3 = 0usize;
        for _ in 0..n {
            let smp = d.sample(&mut s);
            assert_eq!(smp.measure, Measure::Discrete);
            if smp.x == 1.0 {
                c1 += 1;
            } else {
                assert_eq!(smp.x, 3.0);
                c3 += 1;
            }
        }
        let l1 = (c1 as Float / n as Float - 0.25).abs() + (c3 as Float / n as Float - 0.75).abs();
        assert!(l1 < 0.01, "l1 {l1}");
    }

    #[test]
    fn tabulate_accumulates() {
        let d = atoms();
        let tbl = d.tabulate(&Range::new(0.0, 4.0), 4);
        assert_eq!(tbl[1], 1.0); // atom at 1
        assert_eq!(tbl[3], 3.0); // atom at 3
    }

    #[test]
    fn indexed_distribution() {
        let d = IndexedDiscreteDistribution::new(&[0.0, 2.0, 6.0]);
        assert_eq!(d.pdf(0), 0.0);
        assert!((d.pdf(1) - 0.25).abs() < 1e-12);
        let mut s = UniformSampler::new(9);
        for _ in 0..100 {
            assert_ne!(d.sample(&mut s), 0);
        }
    }
}
