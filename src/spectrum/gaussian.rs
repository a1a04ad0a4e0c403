//! Gaussian spectrum.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::{Distribution1D, TruncatedGaussian1D};
use crate::math::{Complex, Float, Range, Wavenumber, WavenumberRange};
use crate::sampler::Measure;
use crate::{Error, Result};

/// A Gaussian spectral profile centred at `mu` with width `sigma`,
/// truncated to a wavenumber range and scaled to a total power.
pub struct GaussianSpectrum {
    dist: Distribution1D,
    krange: WavenumberRange,
    mu: Wavenumber,
    total_power: Float,
}

impl GaussianSpectrum {
    pub fn new(
        mu: Wavenumber,
        sigma: Wavenumber,
        krange: WavenumberRange,
        total_power: Float,
    ) -> Result<Self> {
        if krange.is_empty() {
            return Err(Error::InvalidSpectrum("empty wavenumber range".into()));
        }
        if total_power < 0.0 {
            return Err(Error::InvalidSpectrum("negative total power".into()));
        }
        Ok(Self {
            dist: Distribution1D::TruncatedGaussian(TruncatedGaussian1D::new(
                sigma.inv_mm(),
                mu.inv_mm(),
                &Range::new(krange.min.inv_mm(), krange.max.inv_mm()),
            )),
            krange,
            mu,
            total_power,
        })
    }

    fn gaussian(&self) -> &TruncatedGaussian1D {
        match &self.dist {
            Distribution1D::TruncatedGaussian(d) => d,
            _ => unreachable!(),
        }
    }
}

impl Spectrum for GaussianSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        self.krange
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for GaussianSpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        Some(&self.dist)
    }

    fn power(&self) -> Float {
        self.total_power
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        self.total_power
            * self
                .gaussian()
                .integrate(&Range::new(range.min.inv_mm(), range.max.inv_mm()))
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.mu
    }

    fn f(&self, k: Wavenumber) -> Float {
        self.total_power * self.gaussian().pdf(k.inv_mm(), Measure::Continuous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_concentrated_near_mean() {
        let mu = Wavenumber::from_inv_mm(1000.0);
        let sigma = Wavenumber::from_inv_mm(10.0);
        let kr = Range::new(Wavenumber::from_inv_mm(900.0), Wavenumber::from_inv_mm(1100.0));
        let s = GaussianSpectrum::new(mu, sigma, kr, 5.0).unwrap();
        assert!((s.power() - 5.0).abs() < 1e-12);
        // ±2σ holds ≈95% of the power
        let r2 = Range::new(Wavenumber::from_inv_mm(980.0), Wavenumber::from_inv_mm(1020.0));
        assert!((s.power_over(&r2) / 5.0 - 0.954).abs() < 5e-3);
        assert!(s.f(mu) > s.f(Wavenumber::from_inv_mm(1030.0)));
    }
}
