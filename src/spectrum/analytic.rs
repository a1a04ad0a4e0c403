//! Analytic spectrum from a user-supplied closure.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::Distribution1D;
use crate::math::{Complex, Float, Wavenumber, WavenumberRange};

/// Wraps an arbitrary real-valued function of wavenumber.
/// Provides no underlying distribution; `power()` queries return 0.
pub struct AnalyticSpectrum {
    range: WavenumberRange,
    func: Box<dyn Fn(Wavenumber) -> Float + Send + Sync>,
}

impl AnalyticSpectrum {
    pub fn new(
        range: WavenumberRange,
        func: impl Fn(Wavenumber) -> Float + Send + Sync + 'static,
    ) -> Self {
        Self {
            range,
            func: Box::new(func),
        }
    }
}

impl Spectrum for AnalyticSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        self.range
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for AnalyticSpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        // not supported
        None
    }

    fn power(&self) -> Float {
        // not supported
        0.0
    }

    fn power_over(&self, _range: &WavenumberRange) -> Float {
        // not supported
        0.0
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.range.centre()
    }

    fn f(&self, k: Wavenumber) -> Float {
        if self.range.contains(k) {
            (self.func)(k)
        } else {
            0.0
        }
    }
}
