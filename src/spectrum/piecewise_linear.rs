//! Piecewise-linear spectrum.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::{Distribution1D, PiecewiseLinearDistribution};
use crate::math::{Complex, Float, Range, Vec2, Wavenumber, WavenumberRange};
use crate::{Error, Result};

/// Spectral power tabulated at sorted wavenumber knots with linear
/// interpolation in between.
pub struct PiecewiseLinearSpectrum {
    dist: Distribution1D,
    mean_k: Wavenumber,
}

impl PiecewiseLinearSpectrum {
    /// Builds from `(k in 1/mm, power)` knots with ascending `k`.
    pub fn new(knots: Vec<Vec2>) -> Result<Self> {
        if knots.len() < 2 {
            return Err(Error::InvalidSpectrum(
                "piecewise-linear spectrum needs at least 2 knots".into(),
            ));
        }
        if knots.windows(2).any(|w| w[1].x < w[0].x) || knots.iter().any(|k| k.y < 0.0) {
            return Err(Error::InvalidSpectrum(
                "knots must be sorted with non-negative power".into(),
            ));
        }

        let pwl = PiecewiseLinearDistribution::new(knots);
        // power-weighted mean wavenumber
        let mut wsum = 0.0;
        let mut psum = 0.0;
        for w in pwl.knots().windows(2) {
            let p = (w[1].x - w[0].x) * (w[0].y + w[1].y) / 2.0;
            wsum += p * (w[0].x + w[1].x) / 2.0;
            psum += p;
        }
        let mean_k = Wavenumber::from_inv_mm(if psum > 0.0 {
            wsum / psum
        } else {
            (pwl.range().min + pwl.range().max) / 2.0
        });

        Ok(Self {
            dist: Distribution1D::PiecewiseLinear(pwl),
            mean_k,
        })
    }

    fn pwl(&self) -> &PiecewiseLinearDistribution {
        match &self.dist {
            Distribution1D::PiecewiseLinear(d) => d,
            _ => unreachable!(),
        }
    }
}

impl Spectrum for PiecewiseLinearSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        let r = self.pwl().range();
        Range::new(Wavenumber::from_inv_mm(r.min), Wavenumber::from_inv_mm(r.max))
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for PiecewiseLinearSpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        Some(&self.dist)
    }

    fn power(&self) -> Float {
        self.pwl().total()
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        self.pwl().integrate(range.min.inv_mm(), range.max.inv_mm())
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.mean_k
    }

    fn f(&self, k: Wavenumber) -> Float {
        self.pwl().value(k.inv_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_and_mean() {
        let s = PiecewiseLinearSpectrum::new(vec![
            Vec2::new(100.0, 0.0),
            Vec2::new(200.0, 2.0),
            Vec2::new(300.0, 0.0),
        ])
        .unwrap();
        assert!((s.power() - 200.0).abs() < 1e-9);
        assert!((s.mean_wavenumber().inv_mm() - 200.0).abs() < 1e-9);
        assert!((s.f(Wavenumber::from_inv_mm(150.0)) - 1.0).abs() < 1e-9);
        assert!((s.power_over(&Range::new(
            Wavenumber::from_inv_mm(100.0),
            Wavenumber::from_inv_mm(200.0)
        )) - 100.0)
            .abs()
            < 1e-9);
    }

    #[test]
    fn rejects_unsorted() {
        assert!(
            PiecewiseLinearSpectrum::new(vec![Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0)]).is_err()
        );
    }
}
