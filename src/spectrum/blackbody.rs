//! Blackbody spectrum.

use super::{PiecewiseLinearSpectrum, Spectrum, SpectrumReal};
use crate::math::distribution::Distribution1D;
use crate::math::{
    wavelen_to_wavenum, Complex, Float, Range, Temperature, Vec2, Vec3, Wavelength, Wavenumber,
    WavenumberRange,
};
use crate::{Error, Result};

// Planck's law constants (SI).
const H: f64 = 6.626_070_15e-34; // J s
const C: f64 = 2.997_924_58e8; // m/s
const KB: f64 = 1.380_649e-23; // J/K

// Spectral radiance of a blackbody at wavelength lambda (metres), W/(sr m³).
fn planck(lambda_m: f64, t: f64) -> f64 {
    let l5 = lambda_m.powi(5);
    2.0 * H * C * C / (l5 * ((H * C / (lambda_m * KB * t)).exp_m1()))
}

/// Blackbody radiator spectrum. Underneath, a tightly-sampled piecewise
/// linear distribution, enabling sampling support.
pub struct BlackbodySpectrum {
    spectrum: PiecewiseLinearSpectrum,
    temperature: Temperature,
}

/// Number of Planck-law samples per constructed spectrum.
const SAMPLES: usize = 256;

impl BlackbodySpectrum {
    /// Builds the spectrum of a radiator at temperature `t` Kelvin over a
    /// wavelength range, scaled by `scale`.
    pub fn new(t: Temperature, wl_range: (Wavelength, Wavelength), scale: Float) -> Result<Self> {
        if t <= 0.0 {
            return Err(Error::InvalidSpectrum("temperature must be positive".into()));
        }
        let (wl_min, wl_max) = wl_range;
        if wl_min.mm() <= 0.0 || wl_max.mm() <= wl_min.mm() {
            return Err(Error::InvalidSpectrum("invalid wavelength range".into()));
        }

        // sample Planck's law over k; the wavelength range flips under the
        // k = 2π/λ mapping
        let k0 = wavelen_to_wavenum(wl_max).inv_mm();
        let k1 = wavelen_to_wavenum(wl_min).inv_mm();
        let mut knots = Vec::with_capacity(SAMPLES);
        for i in 0..SAMPLES {
            let k = k0 + (k1 - k0) * i as Float / (SAMPLES - 1) as Float;
            let lambda_m = (crate::math::TWO_PI / k) as f64 * 1e-3;
            knots.push(Vec2::new(k, (planck(lambda_m, t as f64) as Float) * scale));
        }

        Ok(Self {
            spectrum: PiecewiseLinearSpectrum::new(knots)?,
            temperature: t,
        })
    }

    /// Temperature in Kelvin of the blackbody radiator.
    #[inline]
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// The Planckian locus: the XYZ tristimulus colour of the radiator.
    pub fn locus_xyz(&self) -> Vec3 {
        // Kim et al. cubic spline approximation of the Planckian locus
        let t = self.temperature as Float;
        let t2 = t * t;
        let t3 = t2 * t;
        let x = if t < 4000.0 {
            -0.2661239e9 / t3 - 0.2343589e6 / t2 + 0.8776956e3 / t + 0.179910
        } else {
            -3.0258469e9 / t3 + 2.1070379e6 / t2 + 0.2226347e3 / t + 0.240390
        };
        let x2 = x * x;
        let x3 = x2 * x;
        let y = if t < 2222.0 {
            -1.1063814 * x3 - 1.34811020 * x2 + 2.18555832 * x - 0.20219683
        } else if t < 4000.0 {
            -0.9549476 * x3 - 1.37418593 * x2 + 2.09137015 * x - 0.16748867
        } else {
            3.0817580 * x3 - 5.87338670 * x2 + 3.75112997 * x - 0.37001483
        };
        // xyY (Y=1) to XYZ
        Vec3::new(x / y, 1.0, (1.0 - x - y) / y)
    }
}

impl Spectrum for BlackbodySpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        self.spectrum.wavenumber_range()
    }

    fn value(&self, k: Wavenumber) -> Complex {
        self.spectrum.value(k)
    }
}

impl SpectrumReal for BlackbodySpectrum {
    fn distribution(&self) -> Option<&Distribution1D> {
        self.spectrum.distribution()
    }

    fn power(&self) -> Float {
        self.spectrum.power()
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        self.spectrum.power_over(range)
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.spectrum.mean_wavenumber()
    }

    fn f(&self, k: Wavenumber) -> Float {
        self.spectrum.f(k)
    }
}
