//! Spectra: real- and complex-valued functions of wavenumber.
//!
//! Wavenumber `k` is related to wavelength `λ` via `k = 2π/λ`.

mod analytic;
mod blackbody;
mod binned;
mod composite;
mod constant_complex;
mod discrete;
mod gaussian;
mod piecewise_linear;
mod rgb;
mod uniform;

pub use analytic::*;
pub use binned::*;
pub use blackbody::*;
pub use composite::*;
pub use constant_complex::*;
pub use discrete::*;
pub use gaussian::*;
pub use piecewise_linear::*;
pub use rgb::*;
pub use uniform::*;

use crate::math::distribution::Distribution1D;
use crate::math::{Complex, Float, Wavenumber, WavenumberRange};
use std::sync::Arc;

/// Generic spectrum: a complex-valued function of wavenumber.
pub trait Spectrum: Send + Sync {
    /// The range of wavenumbers for which this spectrum is defined.
    /// Queries outside the range always return 0.
    fn wavenumber_range(&self) -> WavenumberRange;

    /// Queries the spectral value at wavenumber `k`.
    fn value(&self, k: Wavenumber) -> Complex;
}

/// Purely real-valued spectrum, for power and power-like distributions.
pub trait SpectrumReal: Spectrum {
    /// The underlying 1-D distribution over `k` (in 1/mm), when one exists.
    /// Sampling a wavenumber from the spectrum goes through this.
    fn distribution(&self) -> Option<&Distribution1D>;

    /// Total spectral power contained in this spectrum.
    fn power(&self) -> Float;

    /// Spectral power over the provided wavenumber range.
    fn power_over(&self, range: &WavenumberRange) -> Float;

    /// The mean wavenumber of this spectrum.
    fn mean_wavenumber(&self) -> Wavenumber;

    /// Queries the spectral power at wavenumber `k`.
    fn f(&self, k: Wavenumber) -> Float;
}

/// Atomic reference counted `Spectrum`.
pub type ArcSpectrum = Arc<dyn Spectrum>;

/// Atomic reference counted `SpectrumReal`.
pub type ArcSpectrumReal = Arc<dyn SpectrumReal>;
