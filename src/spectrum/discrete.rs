//! Discrete (line) spectrum.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::{DiscreteDistribution, Distribution1D};
use crate::math::{Complex, Float, Range, Vec2, Wavenumber, WavenumberRange};
use crate::sampler::Measure;
use crate::{Error, Result};

/// A sum of spectral lines: Dirac impulses at fixed wavenumbers.
pub struct DiscreteSpectrum {
    dist: Distribution1D,
    total_power: Float,
    mean_k: Wavenumber,
}

impl DiscreteSpectrum {
    /// Builds from `(k in 1/mm, power)` lines with ascending `k`.
    pub fn new(lines: Vec<Vec2>) -> Result<Self> {
        if lines.is_empty() {
            return Err(Error::InvalidSpectrum("no spectral lines provided".into()));
        }
        if lines.windows(2).any(|w| w[1].x < w[0].x) || lines.iter().any(|l| l.y < 0.0) {
            return Err(Error::InvalidSpectrum(
                "lines must be sorted with non-negative power".into(),
            ));
        }

        let total_power: Float = lines.iter().map(|l| l.y).sum();
        let mean = if total_power > 0.0 {
            lines.iter().map(|l| l.x * l.y).sum::<Float>() / total_power
        } else {
            lines[0].x
        };

        Ok(Self {
            dist: Distribution1D::Discrete(DiscreteDistribution::new(lines)),
            total_power,
            mean_k: Wavenumber::from_inv_mm(mean),
        })
    }

    fn atoms(&self) -> &DiscreteDistribution {
        match &self.dist {
            Distribution1D::Discrete(d) => d,
            _ => unreachable!(),
        }
    }
}

impl Spectrum for DiscreteSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        let r = self.atoms().range();
        Range::new(Wavenumber::from_inv_mm(r.min), Wavenumber::from_inv_mm(r.max))
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for DiscreteSpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        Some(&self.dist)
    }

    fn power(&self) -> Float {
        self.total_power
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        let r = Range::new(range.min.inv_mm(), range.max.inv_mm());
        self.atoms()
            .atoms()
            .iter()
            .filter(|l| r.contains(l.x))
            .map(|l| l.y)
            .sum()
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.mean_k
    }

    /// Spectral power carried by a line exactly at `k`; 0 in between lines.
    fn f(&self, k: Wavenumber) -> Float {
        let mass = self.atoms().pdf(k.inv_mm(), Measure::Discrete);
        mass * self.total_power
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_powers() {
        let s = DiscreteSpectrum::new(vec![Vec2::new(100.0, 1.0), Vec2::new(200.0, 3.0)]).unwrap();
        assert_eq!(s.power(), 4.0);
        assert!((s.f(Wavenumber::from_inv_mm(200.0)) - 3.0).abs() < 1e-9);
        assert_eq!(s.f(Wavenumber::from_inv_mm(150.0)), 0.0);
        assert!((s.mean_wavenumber().inv_mm() - 175.0).abs() < 1e-9);
        let r = Range::new(Wavenumber::from_inv_mm(150.0), Wavenumber::from_inv_mm(250.0));
        assert_eq!(s.power_over(&r), 3.0);
    }
}
