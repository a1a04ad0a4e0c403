//! Continuous piecewise-linear distribution.

use super::Sample1D;
use crate::math::{clamp01, mix, Float, Range, Vec2};
use crate::sampler::{Measure, Sampler};

/// Piecewise-linear density over sorted `(x, y)` knots, `y >= 0`.
/// The CDF is built once at construction; sampling inverts the CDF by
/// resolving the linear piece with the quadratic root formula.
#[derive(Clone, Debug)]
pub struct PiecewiseLinearDistribution {
    bins: Vec<Vec2>,
    dcdf: Vec<Float>,
    sum: Float,
    norm: Float,
}

impl PiecewiseLinearDistribution {
    /// Builds the distribution from knots with strictly ascending `x`.
    /// Decreasing steps are collapsed (clamped) rather than rejected.
    pub fn new(mut bins: Vec<Vec2>) -> Self {
        debug_assert!(bins.len() > 1);

        // accumulate
        let mut dcdf = vec![0.0; bins.len()];
        for i in 1..bins.len() {
            let mut dx = bins[i].x - bins[i - 1].x;
            if dx < 0.0 {
                bins[i].x = bins[i - 1].x;
                dx = 0.0;
            }
            dcdf[i] = dcdf[i - 1] + dx * (bins[i].y + bins[i - 1].y) / 2.0;
        }

        // normalize
        let sum = *dcdf.last().unwrap_or(&0.0);
        let recp_sum = if sum > 0.0 { 1.0 / sum } else { 0.0 };
        for c in dcdf.iter_mut() {
            *c *= recp_sum;
        }

        Self {
            bins,
            dcdf,
            sum,
            norm: recp_sum,
        }
    }

    /// Integral of the (unnormalised) knot values.
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
    pub fn knot(&self, idx: usize) -> Vec2 {
        self.bins[idx]
    }

    #[inline]
    pub fn knots(&self) -> &[Vec2] {
        &self.bins
    }

    // interpolated value at x, given the lower_bound iterator position
    fn value_at(&self, x: Float, it: usize) -> Float {
        if it == self.bins.len() {
            return 0.0;
        }
        if it == 0 || self.bins[it].x == x {
            return if self.bins[it].x == x {
                self.bins[it].y
            } else {
                0.0
            };
        }
        let a = self.bins[it - 1];
        let b = self.bins[it];
        let dx = b.x - a.x;
        debug_assert!(dx > 0.0 && x >= a.x && b.x > x);
        mix(a.y, b.y, (x - a.x) / dx)
    }

    // index of the first knot with knot.x >= x
    fn lower_bound(&self, x: Float) -> usize {
        self.bins.partition_point(|b| b.x < x)
    }

    /// Piecewise-linearly interpolated (unnormalised) value at `x`.
    pub fn value(&self, x: Float) -> Float {
        self.value_at(x, self.lower_bound(x))
    }

    /// Integrates the unnormalised values over `[x0, x1]`.
    pub fn integrate(&self, x0: Float, x1: Float) -> Float {
        let mut x0 = x0;
        let mut it = self.lower_bound(x0);
        if it == 0 {
            if x1 <= self.bins[0].x {
                return 0.0;
            }
            x0 = self.bins[0].x.max(x0);
        }
        if it == self.bins.len() {
            return 0.0;
        }

        let mut val = 0.0;
        let mut v0 = Vec2::new(x0, self.value_at(x0, it));
        loop {
            let v1 = if self.bins[it].x <= x1 {
                self.bins[it]
            } else {
                Vec2::new(x1, self.value_at(x1, it))
            };
            val += (v1.x - v0.x) * (v1.y + v0.y) / 2.0;

            v0 = v1;
            it += 1;
            if it == self.bins.len() || self.bins[it - 1].x >= x1 {
                break;
            }
        }

        val
    }

    /// PDF of the distribution at `x`.
    #[inline]
    pub fn pdf(&self, x: Float, measure: Measure) -> Float {
        if measure == Measure::Continuous {
            self.value(x) * self.norm
        } else {
            0.0
        }
    }

    /// Inverse CDF: position and unnormalised value for a CDF value in
    /// `[0, 1]`. Linear pieces are inverted via the quadratic root formula,
    /// with the interpolation parameter clamped to `[0, 1]`.
    pub fn icdf(&self, v: Float) -> Vec2 {
        debug_assert!((0.0..=1.0).contains(&v));

        let it = self.dcdf.partition_point(|c| *c < v);
        let mut idx = (it as isize - 1).clamp(0, self.dcdf.len() as isize - 2) as usize;
        while idx + 1 < self.dcdf.len() && self.dcdf[idx + 1] - self.dcdf[idx] == 0.0 {
            idx += 1;
        }

        if idx + 1 == self.dcdf.len() {
            return self.bins[idx];
        }

        debug_assert!(v >= self.dcdf[idx] && v <= self.dcdf[idx + 1]);

        let f = (v - self.dcdf[idx]) / (self.dcdf[idx + 1] - self.dcdf[idx]);
        let a = self.bins[idx];
        let b = self.bins[idx + 1];

        if a.y == b.y {
            return a + (b - a) * f;
        }

        let m = mix(a.y * a.y, b.y * b.y, f);
        let d = m.sqrt();
        let t = clamp01((a.y - d) / (a.y - b.y));

        debug_assert!(t.is_finite());
        debug_assert!(m >= 0.0);

        a + (b - a) * t
    }

    /// Samples from the distribution.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> Sample1D {
        let val = self.icdf(sampler.r());
        Sample1D {
            x: val.x,
            measure: Measure::Continuous,
            pdf: val.y * self.norm,
        }
    }

    /// Point-wise sum of two piecewise-linear distributions, over the merged
    /// knot set.
    // TODO: handle edges correctly
    pub fn add(&self, o: &Self) -> Self {
        let mut v = Vec::with_capacity(self.bins.len() + o.bins.len());

        let (mut it1, mut it2) = (0usize, 0usize);
        while it1 != self.bins.len() || it2 != o.bins.len() {
            if it1 != self.bins.len() && (it2 == o.bins.len() || self.bins[it1].x <= o.bins[it2].x)
            {
                let y2 = o.value_at(self.bins[it1].x, it2);
                v.push(Vec2::new(self.bins[it1].x, self.bins[it1].y + y2));
                if it2 != o.bins.len() && o.bins[it2].x == self.bins[it1].x {
                    it2 += 1;
                }
                it1 += 1;
            } else {
                let y1 = self.value_at(o.bins[it2].x, it1);
                v.push(Vec2::new(o.bins[it2].x, y1 + o.bins[it2].y));
                if it1 != self.bins.len() && o.bins[it2].x == self.bins[it1].x {
                    it1 += 1;
                }
                it2 += 1;
            }
        }

        Self::new(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::UniformSampler;

    fn triangle() -> PiecewiseLinearDistribution {
        // triangular density on [0, 2], peak at 1
        PiecewiseLinearDistribution::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 0.0),
        ])
    }

    #[test]
    fn value_and_total() {
        let d = triangle();
        assert!((d.total() - 1.0).abs() < 1e-12);
        assert!((d.value(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(d.value(2.5), 0.0);
    }

    #[test]
    fn integrate_subranges() {
        let d = triangle();
        assert!((d.integrate(0.0, 2.0) - 1.0).abs() < 1e-12);
        assert!((d.integrate(0.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((d.integrate(0.5, 1.5) - 0.75).abs() < 1e-12);
        assert_eq!(d.integrate(2.0, 3.0), 0.0);
    }

    #[test]
    fn icdf_monotone_and_consistent() {
        let d = triangle();
        let mut prev = -1.0;
        for i in 0..=100 {
            let v = i as Float / 100.0;
            let p = d.icdf(v);
            assert!(p.x >= prev);
            prev = p.x;
            assert!((d.value(p.x) - p.y).abs() < 1e-9);
        }
        // median of the symmetric triangle is the peak
        assert!((d.icdf(0.5).x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unbiased_reciprocal_pdf() {
        let d = triangle();
        let mut s = UniformSampler::new(3);
        let n = 100_000;
        let mut acc = 0.0;
        for _ in 0..n {
            let smp = d.sample(&mut s);
            acc += 1.0 / smp.pdf;
        }
        // E[1/pdf] = measure of the support
        assert!((acc / n as Float - 2.0).abs() < 0.05);
    }

    #[test]
    fn tabulated_pdf_integrates_to_one() {
        let d = super::super::Distribution1D::PiecewiseLinear(triangle());
        let bins = 4096;
        let tbl = d.tabulate(&Range::new(0.0, 2.0), bins);
        let dx = 2.0 / bins as Float;
        let total: Float = tbl.iter().map(|y| y * dx).sum();
        assert!((total - 1.0).abs() < 1e-3, "total {total}");
    }

    #[test]
    fn addition_merges_knots() {
        let a = triangle();
        let b = PiecewiseLinearDistribution::new(vec![Vec2::new(0.5, 2.0), Vec2::new(1.5, 2.0)]);
        let c = a.add(&b);
        assert!((c.value(1.0) - 3.0).abs() < 1e-12);
        assert!((c.value(0.25) - 0.25).abs() < 1e-12);
    }
}
