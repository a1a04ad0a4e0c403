//! Colour encodings for integer-encoded texel storage.

use crate::math::Float;

/// Colour encoding of stored texels. Ignored for floating-point storage,
/// whose values are linear by definition.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ColourEncoding {
    Linear,
    Gamma(Float),
    Srgb,
}

impl ColourEncoding {
    /// Decodes a normalised stored value into linear floating point.
    pub fn to_linear_fp(&self, u: Float) -> Float {
        match self {
            Self::Linear => u,
            Self::Gamma(g) => u.powf(*g),
            Self::Srgb => {
                if u <= 0.04045 {
                    u / 12.92
                } else {
                    ((u + 0.055) / 1.055).powf(2.4)
                }
            }
        }
    }

    /// Decodes a normalised stored value without applying the transfer
    /// curve. Alpha channels are assumed linear and go through this.
    #[inline]
    pub fn to_fp(&self, u: Float) -> Float {
        u
    }

    /// Encodes a linear value for storage/display.
    pub fn from_linear_fp(&self, v: Float) -> Float {
        match self {
            Self::Linear => v,
            Self::Gamma(g) => v.powf(1.0 / *g),
            Self::Srgb => {
                if v <= 0.0031308 {
                    v * 12.92
                } else {
                    1.055 * v.powf(1.0 / 2.4) - 0.055
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_roundtrip() {
        let e = ColourEncoding::Srgb;
        for u in [0.0, 0.02, 0.2, 0.5, 1.0] {
            let lin = e.to_linear_fp(u);
            assert!((e.from_linear_fp(lin) - u).abs() < 1e-9);
        }
    }

    #[test]
    fn gamma_decode() {
        let e = ColourEncoding::Gamma(2.2);
        assert!((e.to_linear_fp(0.5) - 0.5f64.powf(2.2) as Float).abs() < 1e-9);
        assert_eq!(e.to_fp(0.5), 0.5);
    }
}
