//! Filtered 2-D textures.

use super::{ColourEncoding, TexelStorage};
use crate::math::{fract, Float, Vec2, Vec4};
use crate::stats;

/// Texture filter kind.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TextureFilter {
    Nearest,
    Bilinear,
    Bicubic,
}

/// Per-axis wrap behaviour for out-of-bounds texel coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TextureWrapMode {
    /// Wrap around modulo the image dimension.
    Repeat,
    /// Clamp to the edge texel.
    Clamp,
    /// Triangle-wave reflection.
    Mirror,
    /// Constant black outside the image.
    Black,
    /// Constant white outside the image.
    White,
}

/// Clamp policy applied to filtered texel values.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TexelClampMode {
    None,
    /// Clamp each channel to `[0, 1]`.
    Unit,
    /// Clamp each channel to non-negative values.
    NonNegative,
}

/// Texture sampling configuration.
#[derive(Copy, Clone, Debug)]
pub struct Texture2DConfig {
    pub filter: TextureFilter,
    pub uwrap: TextureWrapMode,
    pub vwrap: TextureWrapMode,
    pub texel_clamp: TexelClampMode,
}

impl Default for Texture2DConfig {
    fn default() -> Self {
        Self {
            filter: TextureFilter::Bilinear,
            uwrap: TextureWrapMode::Repeat,
            vwrap: TextureWrapMode::Repeat,
            texel_clamp: TexelClampMode::None,
        }
    }
}

// Out-of-bounds sentinel produced by wrap_coord for the constant modes.
const OOB: i32 = -1;

fn wrap_coord(mode: TextureWrapMode, c: i32, dim: u32) -> i32 {
    let d = dim as i32;
    match mode {
        TextureWrapMode::Repeat => c.rem_euclid(d),
        TextureWrapMode::Clamp => c.clamp(0, d - 1),
        TextureWrapMode::Mirror => {
            let m = c.rem_euclid(2 * d);
            if m < d {
                m
            } else {
                2 * d - 1 - m
            }
        }
        TextureWrapMode::Black | TextureWrapMode::White => {
            if (0..d).contains(&c) {
                c
            } else {
                OOB
            }
        }
    }
}

/// A texture is a 2-D bitmap with filtering and colour-encoding
/// facilities. Min/max/mean of the RGBA-converted texel set are cached at
/// construction; a texture is constant iff min equals max.
pub struct Texture2D {
    storage: TexelStorage,
    config: Texture2DConfig,
    /// Colour encoding for integer-component storage; ignored for floating
    /// point storage.
    colour_encoding: ColourEncoding,

    min_value: Vec4,
    max_value: Vec4,
    avg_value: Vec4,
}

impl Texture2D {
    pub fn new(
        storage: TexelStorage,
        config: Texture2DConfig,
        colour_encoding: ColourEncoding,
    ) -> Self {
        let mut tex = Self {
            storage,
            config,
            colour_encoding,
            min_value: Vec4::splat(Float::INFINITY),
            max_value: Vec4::splat(Float::NEG_INFINITY),
            avg_value: Vec4::zero(),
        };
        tex.compute_texture_data();
        tex
    }

    fn compute_texture_data(&mut self) {
        let (w, h) = self.storage.dimensions();
        for y in 0..h {
            for x in 0..w {
                let t = self.texel((x as i32, y as i32));
                self.min_value = self.min_value.min(&t);
                self.max_value = self.max_value.max(&t);
                self.avg_value += t;
            }
        }
        self.avg_value /= (w * h) as Float;
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.storage.dimensions()
    }

    #[inline]
    pub fn storage(&self) -> &TexelStorage {
        &self.storage
    }

    #[inline]
    pub fn filter_kind(&self) -> TextureFilter {
        self.config.filter
    }

    #[inline]
    pub fn colour_encoding(&self) -> ColourEncoding {
        self.colour_encoding
    }

    /// Minimal RGBA texel value.
    #[inline]
    pub fn minimum_value(&self) -> Vec4 {
        self.min_value
    }

    /// Maximal RGBA texel value.
    #[inline]
    pub fn maximum_value(&self) -> Vec4 {
        self.max_value
    }

    /// Mean RGBA texel value.
    #[inline]
    pub fn mean_value(&self) -> Vec4 {
        self.avg_value
    }

    /// TRUE for textures that are constant.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.min_value == self.max_value
    }

    /// Accesses a single texel, applying wrap modes, colour decoding and
    /// layout conversion to RGBA. The configured texel clamp is not applied.
    pub fn texel(&self, coord: (i32, i32)) -> Vec4 {
        let (w, h) = self.storage.dimensions();
        let x = wrap_coord(self.config.uwrap, coord.0, w);
        let y = wrap_coord(self.config.vwrap, coord.1, h);

        // out of bounds under a constant wrap mode: black/white sentinel
        // texel, alpha forced to 1 when an alpha channel exists
        if x == OOB || y == OOB {
            let mode = if x == OOB {
                self.config.uwrap
            } else {
                self.config.vwrap
            };
            let v = if mode == TextureWrapMode::Black { 0.0 } else { 1.0 };
            let layout = self.storage.layout();
            let mut native = [v; 4];
            if let Some(a) = layout.alpha_component() {
                native[a] = 1.0;
            }
            return layout.to_rgba(&native[..layout.components()]);
        }

        let layout = self.storage.layout();
        let alpha = layout.alpha_component();
        let fp = self.storage.component_type().is_floating_point();
        let mut native = [0.0; 4];
        for c in 0..layout.components() {
            let u = self.storage.read_component(x as u32, y as u32, c);
            // integer-encoded storage decodes through the colour encoding;
            // alpha is assumed linear
            native[c] = if fp {
                u
            } else if Some(c) == alpha {
                self.colour_encoding.to_fp(u)
            } else {
                self.colour_encoding.to_linear_fp(u)
            };
        }
        layout.to_rgba(&native[..layout.components()])
    }

    /// Bilinear interpolation of the 2×2 neighbourhood.
    fn bilinear(&self, uv: Vec2) -> Vec4 {
        let (w, h) = self.dimensions();
        let st = Vec2::new(uv.x * w as Float - 0.5, uv.y * h as Float - 0.5);
        let ix = st.x.floor() as i32;
        let iy = st.y.floor() as i32;
        let fx = fract(st.x);
        let fy = fract(st.y);

        let t00 = self.texel((ix, iy));
        let t10 = self.texel((ix + 1, iy));
        let t01 = self.texel((ix, iy + 1));
        let t11 = self.texel((ix + 1, iy + 1));

        let a = t00 + (t10 - t00) * fx;
        let b = t01 + (t11 - t01) * fx;
        let ret = a + (b - a) * fy;
        debug_assert!(ret.is_finite());
        ret
    }

    /// Bicubic interpolation of the 4×4 neighbourhood with the Catmull-Rom
    /// style kernel.
    fn bicubic(&self, uv: Vec2) -> Vec4 {
        let (w, h) = self.dimensions();
        let st = Vec2::new(uv.x * w as Float - 0.5, uv.y * h as Float - 0.5);
        let ix = st.x.floor() as i32;
        let iy = st.y.floor() as i32;
        let fx = fract(st.x);
        let fy = fract(st.y);

        fn kernel(x: Float, p0: Vec4, p1: Vec4, p2: Vec4, p3: Vec4) -> Vec4 {
            p1 + (p2 - p0) * (0.5 * x)
                + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * (0.5 * x * x)
                + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * (0.5 * x * x * x)
        }

        let mut rows = [Vec4::zero(); 4];
        for (row, out) in rows.iter_mut().enumerate() {
            let y = iy + row as i32 - 1;
            let p0 = self.texel((ix - 1, y));
            let p1 = self.texel((ix, y));
            let p2 = self.texel((ix + 1, y));
            let p3 = self.texel((ix + 2, y));
            *out = kernel(fx, p0, p1, p2, p3);
        }

        let ret = kernel(fy, rows[0], rows[1], rows[2], rows[3]);
        debug_assert!(ret.is_finite());
        ret
    }

    fn clamp_texel(&self, mut v: Vec4) -> Vec4 {
        match self.config.texel_clamp {
            TexelClampMode::None => v,
            TexelClampMode::Unit => {
                for c in 0..4 {
                    v[c] = v[c].clamp(0.0, 1.0);
                }
                v
            }
            TexelClampMode::NonNegative => {
                for c in 0..4 {
                    v[c] = v[c].max(0.0);
                }
                v
            }
        }
    }

    /// Filters the texture at `uv ∈ [0,1]²`. The v axis is flipped before
    /// filtering by convention.
    pub fn filter(&self, mut uv: Vec2) -> Vec4 {
        let start = stats::filter_timer_start();

        // flip v
        uv.y = 1.0 - uv.y;

        let ret = match self.config.filter {
            TextureFilter::Nearest => {
                let (w, h) = self.dimensions();
                let coords = (
                    (uv.x * w as Float - 0.5).round() as i32,
                    (uv.y * h as Float - 0.5).round() as i32,
                );
                let ret = self.texel(coords);
                stats::on_bitmap_filter(1, start);
                ret
            }
            TextureFilter::Bilinear => {
                let ret = self.bilinear(uv);
                stats::on_bitmap_filter(4, start);
                ret
            }
            TextureFilter::Bicubic => {
                let ret = self.bicubic(uv);
                stats::on_bitmap_filter(16, start);
                ret
            }
        };

        self.clamp_texel(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{ComponentType, PixelLayout};

    fn checkerboard(w: u32, h: u32) -> Texture2D {
        let mut vals = Vec::new();
        for y in 0..h {
            for x in 0..w {
                vals.push(if (x + y) % 2 == 0 { 1.0f32 } else { 0.0 });
            }
        }
        Texture2D::new(
            TexelStorage::from_f32(&vals, (w, h), PixelLayout::L),
            Texture2DConfig {
                filter: TextureFilter::Nearest,
                ..Default::default()
            },
            ColourEncoding::Linear,
        )
    }

    fn constant(v: f32, filter: TextureFilter) -> Texture2D {
        Texture2D::new(
            TexelStorage::from_f32(&[v; 16], (4, 4), PixelLayout::L),
            Texture2DConfig {
                filter,
                ..Default::default()
            },
            ColourEncoding::Linear,
        )
    }

    #[test]
    fn nearest_matches_round() {
        let t = checkerboard(4, 4);
        // uv centred on texel (1, 2): note the v flip
        let uv = Vec2::new((1.0 + 0.5) / 4.0, 1.0 - (2.0 + 0.5) / 4.0);
        let expect = t.texel((1, 2));
        assert_eq!(t.filter(uv), expect);
    }

    #[test]
    fn bilinear_constant_at_pixel_centre() {
        let t = constant(0.37, TextureFilter::Bilinear);
        let v = t.filter(Vec2::new(0.5 / 4.0 + 0.25, 0.5));
        assert!((v.x - 0.37).abs() < 1e-6);
    }

    #[test]
    fn bicubic_preserves_constants() {
        let t = constant(0.6, TextureFilter::Bicubic);
        for uv in [
            Vec2::new(0.1, 0.3),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.9, 0.7),
        ] {
            let v = t.filter(uv);
            assert!((v.x - 0.6).abs() < 1e-6, "uv {uv:?} -> {v:?}");
        }
    }

    #[test]
    fn wrap_modes() {
        // repeat wraps modulo; clamp pins to the edge; mirror reflects
        assert_eq!(wrap_coord(TextureWrapMode::Repeat, 5, 4), 1);
        assert_eq!(wrap_coord(TextureWrapMode::Repeat, -1, 4), 3);
        assert_eq!(wrap_coord(TextureWrapMode::Clamp, -3, 4), 0);
        assert_eq!(wrap_coord(TextureWrapMode::Clamp, 9, 4), 3);
        assert_eq!(wrap_coord(TextureWrapMode::Mirror, 4, 4), 3);
        assert_eq!(wrap_coord(TextureWrapMode::Mirror, -1, 4), 0);
        assert_eq!(wrap_coord(TextureWrapMode::Black, 2, 4), 2);
        assert_eq!(wrap_coord(TextureWrapMode::Black, 4, 4), OOB);
    }

    #[test]
    fn repeat_is_periodic() {
        let t = checkerboard(4, 4);
        let a = t.filter(Vec2::new(0.3, 0.4));
        let b = t.filter(Vec2::new(1.3, 0.4));
        assert_eq!(a, b);
    }

    #[test]
    fn mirror_is_symmetric_at_edge() {
        let mut vals = Vec::new();
        for i in 0..8 {
            vals.push(i as f32 / 8.0);
        }
        let t = Texture2D::new(
            TexelStorage::from_f32(&vals, (8, 1), PixelLayout::L),
            Texture2DConfig {
                filter: TextureFilter::Nearest,
                uwrap: TextureWrapMode::Mirror,
                vwrap: TextureWrapMode::Clamp,
                texel_clamp: TexelClampMode::None,
            },
            ColourEncoding::Linear,
        );
        let eps = 0.01;
        let a = t.filter(Vec2::new(1.0 + eps, 0.5));
        let b = t.filter(Vec2::new(1.0 - eps, 0.5));
        assert_eq!(a, b);
    }

    #[test]
    fn black_wrap_returns_black_with_alpha() {
        let t = Texture2D::new(
            TexelStorage::from_f32(&[0.5; 32], (4, 4), PixelLayout::La),
            Texture2DConfig {
                filter: TextureFilter::Nearest,
                uwrap: TextureWrapMode::Black,
                vwrap: TextureWrapMode::Black,
                texel_clamp: TexelClampMode::None,
            },
            ColourEncoding::Linear,
        );
        let v = t.texel((-1, 0));
        assert_eq!(v, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn constant_detection_and_stats_cache() {
        let t = constant(0.25, TextureFilter::Bilinear);
        assert!(t.is_constant());
        assert_eq!(t.mean_value().x, 0.25);
        let c = checkerboard(4, 4);
        assert!(!c.is_constant());
        assert!((c.mean_value().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn srgb_decoding_applied_to_integer_storage() {
        let t = Texture2D::new(
            TexelStorage::new(vec![128; 4], (2, 2), PixelLayout::L, ComponentType::U8),
            Texture2DConfig {
                filter: TextureFilter::Nearest,
                ..Default::default()
            },
            ColourEncoding::Srgb,
        );
        let expect = ColourEncoding::Srgb.to_linear_fp(128.0 / 255.0);
        assert!((t.texel((0, 0)).x - expect).abs() < 1e-9);
    }
}
