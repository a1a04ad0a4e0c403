//! Binned piecewise-linear spectrum.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::{BinnedPiecewiseLinearDistribution, Distribution1D};
use crate::math::{Complex, Float, Range, Wavenumber, WavenumberRange};
use crate::{Error, Result};

/// Spectral power on equally spaced wavenumber bins. Cheap to query and
/// fast to sample through the binned inverse CDF.
pub struct BinnedSpectrum {
    dist: Distribution1D,
}

impl BinnedSpectrum {
    pub fn new(ys: Vec<Float>, krange: WavenumberRange) -> Result<Self> {
        if ys.len() < 2 || krange.is_empty() {
            return Err(Error::InvalidSpectrum(
                "binned spectrum needs at least 2 values over a non-empty range".into(),
            ));
        }
        if ys.iter().any(|y| *y < 0.0 || !y.is_finite()) {
            return Err(Error::InvalidSpectrum(
                "binned spectrum values must be finite and non-negative".into(),
            ));
        }
        Ok(Self {
            dist: Distribution1D::BinnedPiecewiseLinear(BinnedPiecewiseLinearDistribution::new(
                ys,
                Range::new(krange.min.inv_mm(), krange.max.inv_mm()),
            )),
        })
    }

    pub fn from_distribution(d: BinnedPiecewiseLinearDistribution) -> Self {
        Self {
            dist: Distribution1D::BinnedPiecewiseLinear(d),
        }
    }

    fn binned(&self) -> &BinnedPiecewiseLinearDistribution {
        match &self.dist {
            Distribution1D::BinnedPiecewiseLinear(d) => d,
            _ => unreachable!(),
        }
    }
}

impl Spectrum for BinnedSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        let r = self.binned().range();
        Range::new(Wavenumber::from_inv_mm(r.min), Wavenumber::from_inv_mm(r.max))
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for BinnedSpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        Some(&self.dist)
    }

    fn power(&self) -> Float {
        self.binned().total()
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        self.binned()
            .integrate(range.min.inv_mm(), range.max.inv_mm())
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.wavenumber_range().centre()
    }

    fn f(&self, k: Wavenumber) -> Float {
        self.binned().value(k.inv_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries() {
        let kr = Range::new(Wavenumber::from_inv_mm(0.0), Wavenumber::from_inv_mm(4.0));
        let s = BinnedSpectrum::new(vec![1.0, 1.0, 1.0, 1.0, 1.0], kr).unwrap();
        assert!((s.power() - 4.0).abs() < 1e-9);
        assert!((s.f(Wavenumber::from_inv_mm(1.7)) - 1.0).abs() < 1e-9);
        assert_eq!(s.f(Wavenumber::from_inv_mm(9.0)), 0.0);
    }
}
