//! RGB-uplift spectrum.

use super::{Spectrum, SpectrumReal};
use crate::math::distribution::{BinnedPiecewiseLinearDistribution, Distribution1D};
use crate::math::{
    wavelen_to_wavenum, wavenum_to_wavelen, Complex, Float, Range, Vec3, Wavelength, Wavenumber,
    WavenumberRange,
};
use crate::{Error, Result};

/// Spectral uplifting of RGB reflectances over Smits' component basis:
/// a white base plus the dominant secondary (cyan/magenta/yellow) and
/// primary, each a smooth tabulated spectrum.
mod basis {
    use super::Float;

    pub const LAMBDA_MIN_NM: Float = 380.0;
    pub const LAMBDA_MAX_NM: Float = 720.0;
    pub const BINS: usize = 10;

    pub const WHITE: [Float; BINS] = [
        1.0000, 1.0000, 0.9999, 0.9993, 0.9992, 0.9998, 1.0000, 1.0000, 1.0000, 1.0000,
    ];
    pub const CYAN: [Float; BINS] = [
        0.9710, 0.9426, 1.0007, 1.0007, 1.0007, 1.0007, 0.1564, 0.0000, 0.0000, 0.0000,
    ];
    pub const MAGENTA: [Float; BINS] = [
        1.0000, 1.0000, 0.9685, 0.2229, 0.0000, 0.0458, 0.8369, 1.0000, 1.0000, 0.9959,
    ];
    pub const YELLOW: [Float; BINS] = [
        0.0001, 0.0000, 0.1088, 0.6651, 1.0000, 1.0000, 0.9996, 0.9586, 0.9685, 0.9840,
    ];
    pub const RED: [Float; BINS] = [
        0.1012, 0.0515, 0.0000, 0.0000, 0.0000, 0.0000, 0.8325, 1.0149, 1.0149, 1.0149,
    ];
    pub const GREEN: [Float; BINS] = [
        0.0000, 0.0000, 0.0273, 0.7937, 1.0000, 0.9418, 0.1719, 0.0000, 0.0000, 0.0025,
    ];
    pub const BLUE: [Float; BINS] = [
        1.0000, 1.0000, 0.8916, 0.3323, 0.0000, 0.0000, 0.0003, 0.0369, 0.0483, 0.0496,
    ];

    // nearest-bin basis lookup; the basis spectra are smooth box averages
    pub fn eval(table: &[Float; BINS], lambda_nm: Float) -> Float {
        let t = (lambda_nm - LAMBDA_MIN_NM) / (LAMBDA_MAX_NM - LAMBDA_MIN_NM);
        let i = ((t * BINS as Float) as isize).clamp(0, BINS as isize - 1) as usize;
        table[i]
    }
}

/// Evaluates the uplifted spectrum of an RGB triplet at a wavelength.
pub fn uplift_rgb(rgb: &Vec3, lambda_nm: Float) -> Float {
    use basis::*;
    let (r, g, b) = (rgb.x, rgb.y, rgb.z);

    let mut ret = 0.0;
    if r <= g && r <= b {
        ret += r * eval(&WHITE, lambda_nm);
        if g <= b {
            ret += (g - r) * eval(&CYAN, lambda_nm);
            ret += (b - g) * eval(&BLUE, lambda_nm);
        } else {
            ret += (b - r) * eval(&CYAN, lambda_nm);
            ret += (g - b) * eval(&GREEN, lambda_nm);
        }
    } else if g <= r && g <= b {
        ret += g * eval(&WHITE, lambda_nm);
        if r <= b {
            ret += (r - g) * eval(&MAGENTA, lambda_nm);
            ret += (b - r) * eval(&BLUE, lambda_nm);
        } else {
            ret += (b - g) * eval(&MAGENTA, lambda_nm);
            ret += (r - b) * eval(&RED, lambda_nm);
        }
    } else {
        ret += b * eval(&WHITE, lambda_nm);
        if r <= g {
            ret += (r - b) * eval(&YELLOW, lambda_nm);
            ret += (g - r) * eval(&GREEN, lambda_nm);
        } else {
            ret += (g - b) * eval(&YELLOW, lambda_nm);
            ret += (r - g) * eval(&RED, lambda_nm);
        }
    }
    ret.max(0.0)
}

/// A real-valued spectrum that upsamples an RGB colour triplet to spectral
/// data. Defined between wavelengths of 380nm and 780nm.
pub struct RgbSpectrum {
    rgb: Vec3,
    dist: Distribution1D,
}

/// Visible-range bounds of the uplifted spectrum.
pub const LAMBDA_MIN: Float = 380.0;
pub const LAMBDA_MAX: Float = 780.0;

const UPLIFT_BINS: usize = 64;

impl RgbSpectrum {
    pub fn new(rgb: Vec3) -> Result<Self> {
        if rgb.x < 0.0 || rgb.y < 0.0 || rgb.z < 0.0 {
            return Err(Error::InvalidSpectrum("negative RGB components".into()));
        }

        let kmin = wavelen_to_wavenum(Wavelength::from_nm(LAMBDA_MAX)).inv_mm();
        let kmax = wavelen_to_wavenum(Wavelength::from_nm(LAMBDA_MIN)).inv_mm();
        let ys = (0..UPLIFT_BINS)
            .map(|i| {
                let k = kmin + (kmax - kmin) * i as Float / (UPLIFT_BINS - 1) as Float;
                let lambda = wavenum_to_wavelen(Wavenumber::from_inv_mm(k)).nm();
                uplift_rgb(&rgb, lambda)
            })
            .collect();

        Ok(Self {
            rgb,
            dist: Distribution1D::BinnedPiecewiseLinear(BinnedPiecewiseLinearDistribution::new(
                ys,
                Range::new(kmin, kmax),
            )),
        })
    }

    #[inline]
    pub fn rgb(&self) -> &Vec3 {
        &self.rgb
    }

    fn binned(&self) -> &BinnedPiecewiseLinearDistribution {
        match &self.dist {
            Distribution1D::BinnedPiecewiseLinear(d) => d,
            _ => unreachable!(),
        }
    }
}

impl Spectrum for RgbSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        Range::new(
            wavelen_to_wavenum(Wavelength::from_nm(LAMBDA_MAX)),
            wavelen_to_wavenum(Wavelength::from_nm(LAMBDA_MIN)),
        )
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for RgbSpectrum {
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
        if !self.wavenumber_range().contains(k) {
            return 0.0;
        }
        uplift_rgb(&self.rgb, wavenum_to_wavelen(k).nm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_uplifts_flat() {
        let s = RgbSpectrum::new(Vec3::splat(1.0)).unwrap();
        for nm in [400.0, 500.0, 600.0, 700.0] {
            let k = wavelen_to_wavenum(Wavelength::from_nm(nm));
            assert!((s.f(k) - 1.0).abs() < 0.01, "nm {nm}");
        }
    }

    #[test]
    fn red_is_redder_than_blue() {
        let s = RgbSpectrum::new(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let red_k = wavelen_to_wavenum(Wavelength::from_nm(650.0));
        let blue_k = wavelen_to_wavenum(Wavelength::from_nm(450.0));
        assert!(s.f(red_k) > 0.8);
        assert!(s.f(blue_k) < 0.2);
    }

    #[test]
    fn out_of_range_is_zero() {
        let s = RgbSpectrum::new(Vec3::splat(0.5)).unwrap();
        assert_eq!(s.f(wavelen_to_wavenum(Wavelength::from_nm(900.0))), 0.0);
    }
}
