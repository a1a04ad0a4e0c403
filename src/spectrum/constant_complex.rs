//! Constant complex spectrum.

use super::Spectrum;
use crate::math::{Complex, Range, Wavenumber, WavenumberRange};

/// A fixed complex value for all wavenumbers. The usual way to express
/// wavelength-independent (possibly absorbing) refractive indices.
pub struct ConstantComplexSpectrum {
    value: Complex,
    range: WavenumberRange,
}

impl ConstantComplexSpectrum {
    pub fn new(value: Complex) -> Self {
        Self {
            value,
            range: Range::positive(),
        }
    }

    pub fn with_range(value: Complex, range: WavenumberRange) -> Self {
        Self { value, range }
    }
}

impl Spectrum for ConstantComplexSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        self.range
    }

    fn value(&self, k: Wavenumber) -> Complex {
        if self.range.contains(k) {
            self.value
        } else {
            Complex::ZERO
        }
    }
}
