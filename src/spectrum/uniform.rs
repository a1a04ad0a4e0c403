//! Uniform spectrum.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::{Distribution1D, UniformDistribution};
use crate::math::{Complex, Float, Range, Wavenumber, WavenumberRange};
use crate::{Error, Result};

/// Returns a fixed real constant for all wavenumbers within the range.
/// The range may cover all non-negative wavenumbers or any subset.
pub struct UniformSpectrum {
    dist: Distribution1D,
    krange: WavenumberRange,
    avg_spectral_power: Float,
}

impl UniformSpectrum {
    pub fn new(avg_power: Float, krange: WavenumberRange) -> Result<Self> {
        if avg_power < 0.0 {
            return Err(Error::InvalidSpectrum(
                "a non-negative spectral power must be provided".into(),
            ));
        }
        if krange.is_empty() || krange.min < Wavenumber::ZERO {
            return Err(Error::InvalidSpectrum(
                "range must be non-empty and non-negative".into(),
            ));
        }
        Ok(Self {
            dist: Distribution1D::Uniform(UniformDistribution::new(Range::new(
                krange.min.inv_mm(),
                krange.max.inv_mm(),
            ))),
            krange,
            avg_spectral_power: avg_power,
        })
    }

    /// The average spectral power contained in this spectrum.
    #[inline]
    pub fn average_power(&self) -> Float {
        self.avg_spectral_power
    }
}

impl Spectrum for UniformSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        self.krange
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for UniformSpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        Some(&self.dist)
    }

    fn power(&self) -> Float {
        self.krange.length().inv_mm() * self.avg_spectral_power
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        self.avg_spectral_power * (self.krange & *range).length().inv_mm()
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.krange.centre()
    }

    fn f(&self, k: Wavenumber) -> Float {
        if self.krange.contains(k) {
            self.avg_spectral_power
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn krange(a: Float, b: Float) -> WavenumberRange {
        Range::new(Wavenumber::from_inv_mm(a), Wavenumber::from_inv_mm(b))
    }

    #[test]
    fn power_is_len_times_avg() {
        let s = UniformSpectrum::new(2.0, krange(100.0, 300.0)).unwrap();
        assert_eq!(s.power(), 400.0);
        assert_eq!(s.power_over(&krange(200.0, 500.0)), 200.0);
        assert_eq!(s.f(Wavenumber::from_inv_mm(150.0)), 2.0);
        assert_eq!(s.f(Wavenumber::from_inv_mm(350.0)), 0.0);
    }

    #[test]
    fn rejects_invalid() {
        assert!(UniformSpectrum::new(-1.0, krange(0.0, 1.0)).is_err());
        assert!(UniformSpectrum::new(1.0, krange(3.0, 1.0)).is_err());
    }
}
