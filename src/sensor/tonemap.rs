//! Tonemap operators for developed films.

use crate::bitmap::ColourEncoding;
use crate::math::Float;

/// Maps linear radiometric values into display values.
#[derive(Clone, Debug)]
pub enum Tonemap {
    /// Exposure scale only; the developed film stays linear.
    Linear { exposure: Float },
    /// Exposure scale followed by the sRGB transfer curve.
    Srgb { exposure: Float },
}

impl Tonemap {
    /// Applies the operator to a linear value.
    pub fn apply(&self, v: Float) -> Float {
        match self {
            Self::Linear { exposure } => v * exposure,
            Self::Srgb { exposure } => {
                ColourEncoding::Srgb.from_linear_fp((v * exposure).clamp(0.0, 1.0))
            }
        }
    }

    /// Colour encoding of the developed, tonemapped film.
    pub fn colour_encoding(&self) -> ColourEncoding {
        match self {
            Self::Linear { .. } => ColourEncoding::Linear,
            Self::Srgb { .. } => ColourEncoding::Srgb,
        }
    }
}
