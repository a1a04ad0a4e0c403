//! Spatially and spectrally varying surface attributes.

use crate::bitmap::Texture2D;
use crate::math::{wavenum_to_wavelen, Float, Vec2, Vec4, Wavenumber};
use crate::spectrum::{uplift_rgb, ArcSpectrumReal};
use std::sync::Arc;

/// Query data for a texture lookup at a surface interaction.
#[derive(Copy, Clone, Debug)]
pub struct TextureQuery {
    /// Surface parametrisation coordinates, `[0,1]²`.
    pub uv: Vec2,
    /// Wavenumber of the query.
    pub k: Wavenumber,
}

/// A surface attribute that can vary spatially and spectrally.
pub trait Texture: Send + Sync {
    /// Filtered RGBA value at the query position.
    fn rgba(&self, query: &TextureQuery) -> Vec4;

    /// Scalar spectral value at the query position and wavenumber.
    fn f(&self, query: &TextureQuery) -> Float;

    /// Spatial mean of the spectral value at wavenumber `k`, when
    /// computable.
    fn mean_value(&self, k: Wavenumber) -> Option<Float>;

    /// TRUE when the texture is spatially constant.
    fn is_constant(&self) -> bool;

    /// TRUE for textures that require surface-footprint data.
    fn needs_interaction_footprint(&self) -> bool {
        false
    }
}

/// Atomic reference counted `Texture`.
pub type ArcTexture = Arc<dyn Texture>;

/// A spatially constant scalar value.
pub struct ConstantTexture {
    value: Float,
}

impl ConstantTexture {
    pub fn new(value: Float) -> Self {
        Self { value }
    }
}

impl Texture for ConstantTexture {
    fn rgba(&self, _query: &TextureQuery) -> Vec4 {
        Vec4::new(self.value, self.value, self.value, 1.0)
    }

    fn f(&self, _query: &TextureQuery) -> Float {
        self.value
    }

    fn mean_value(&self, _k: Wavenumber) -> Option<Float> {
        Some(self.value)
    }

    fn is_constant(&self) -> bool {
        true
    }
}

/// A spatially constant, spectrally varying value.
pub struct SpectralTexture {
    spectrum: ArcSpectrumReal,
}

impl SpectralTexture {
    pub fn new(spectrum: ArcSpectrumReal) -> Self {
        Self { spectrum }
    }
}

impl Texture for SpectralTexture {
    fn rgba(&self, query: &TextureQuery) -> Vec4 {
        let v = self.spectrum.f(query.k);
        Vec4::new(v, v, v, 1.0)
    }

    fn f(&self, query: &TextureQuery) -> Float {
        self.spectrum.f(query.k)
    }

    fn mean_value(&self, k: Wavenumber) -> Option<Float> {
        Some(self.spectrum.f(k))
    }

    fn is_constant(&self) -> bool {
        true
    }
}

/// A filtered bitmap, uplifted from RGB to spectral on query.
pub struct BitmapTexture {
    bitmap: Texture2D,
}

impl BitmapTexture {
    pub fn new(bitmap: Texture2D) -> Self {
        Self { bitmap }
    }

    #[inline]
    pub fn bitmap(&self) -> &Texture2D {
        &self.bitmap
    }
}

impl Texture for BitmapTexture {
    fn rgba(&self, query: &TextureQuery) -> Vec4 {
        self.bitmap.filter(query.uv)
    }

    fn f(&self, query: &TextureQuery) -> Float {
        let rgba = self.bitmap.filter(query.uv);
        uplift_rgb(&rgba.xyz(), wavenum_to_wavelen(query.k).nm())
    }

    fn mean_value(&self, k: Wavenumber) -> Option<Float> {
        let mean = self.bitmap.mean_value();
        Some(uplift_rgb(&mean.xyz(), wavenum_to_wavelen(k).nm()))
    }

    fn is_constant(&self) -> bool {
        self.bitmap.is_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::wavelen_to_wavenum;
    use crate::math::{Range, Wavelength};
    use crate::spectrum::UniformSpectrum;

    fn q(k: Float) -> TextureQuery {
        TextureQuery {
            uv: Vec2::new(0.5, 0.5),
            k: Wavenumber::from_inv_mm(k),
        }
    }

    #[test]
    fn constant_texture() {
        let t = ConstantTexture::new(0.5);
        assert_eq!(t.f(&q(100.0)), 0.5);
        assert_eq!(t.mean_value(Wavenumber::from_inv_mm(1.0)), Some(0.5));
        assert!(t.is_constant());
    }

    #[test]
    fn spectral_texture_follows_spectrum() {
        let s = UniformSpectrum::new(
            2.0,
            Range::new(Wavenumber::from_inv_mm(0.0), Wavenumber::from_inv_mm(10.0)),
        )
        .unwrap();
        let t = SpectralTexture::new(Arc::new(s));
        assert_eq!(t.f(&q(5.0)), 2.0);
        assert_eq!(t.f(&q(50.0)), 0.0);
    }

    #[test]
    fn bitmap_uplift_white() {
        use crate::bitmap::*;
        let t = BitmapTexture::new(Texture2D::new(
            TexelStorage::from_f32(&[1.0; 4 * 3], (2, 2), PixelLayout::Rgb),
            Texture2DConfig::default(),
            ColourEncoding::Linear,
        ));
        let k = wavelen_to_wavenum(Wavelength::from_nm(550.0));
        let v = t.f(&TextureQuery {
            uv: Vec2::new(0.5, 0.5),
            k,
        });
        assert!((v - 1.0).abs() < 0.01);
    }
}
