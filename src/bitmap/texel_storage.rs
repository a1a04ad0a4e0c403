//! Packed 2-D texel storage.

use crate::math::{Float, Vec4};
use half::f16;
use num_traits::{Bounded, ToPrimitive};

// normalises an unsigned integer component to [0, 1]
fn unorm<T: Bounded + ToPrimitive>(v: T) -> Float {
    v.to_f64().unwrap_or(0.0) as Float / T::max_value().to_f64().unwrap_or(1.0) as Float
}

/// Per-component storage type.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ComponentType {
    U8,
    U16,
    F16,
    F32,
}

impl ComponentType {
    /// Bytes per pixel component.
    #[inline]
    pub fn bytes(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F16 => 2,
            Self::F32 => 4,
        }
    }

    #[inline]
    pub fn is_floating_point(&self) -> bool {
        matches!(self, Self::F16 | Self::F32)
    }
}

/// Pixel component layout.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PixelLayout {
    L,
    La,
    Rgb,
    Rgba,
}

impl PixelLayout {
    /// Components per pixel.
    #[inline]
    pub fn components(&self) -> usize {
        match self {
            Self::L => 1,
            Self::La => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Index of the alpha component, if the layout has one.
    #[inline]
    pub fn alpha_component(&self) -> Option<usize> {
        match self {
            Self::La => Some(1),
            Self::Rgba => Some(3),
            _ => None,
        }
    }

    /// Converts a native pixel into RGBA.
    pub fn to_rgba(&self, v: &[Float]) -> Vec4 {
        match self {
            Self::L => Vec4::new(v[0], v[0], v[0], 1.0),
            Self::La => Vec4::new(v[0], v[0], v[0], v[1]),
            Self::Rgb => Vec4::new(v[0], v[1], v[2], 1.0),
            Self::Rgba => Vec4::new(v[0], v[1], v[2], v[3]),
        }
    }
}

/// A packed 2-D array of pixels. The component/layout pair is fixed at
/// construction; total size is `w·h·components·component_bytes`.
#[derive(Clone, Debug)]
pub struct TexelStorage {
    data: Vec<u8>,
    dim: (u32, u32),
    layout: PixelLayout,
    component: ComponentType,
}

impl TexelStorage {
    /// Takes ownership of packed pixel data.
    pub fn new(
        data: Vec<u8>,
        dim: (u32, u32),
        layout: PixelLayout,
        component: ComponentType,
    ) -> Self {
        let expect =
            dim.0 as usize * dim.1 as usize * layout.components() * component.bytes();
        assert_eq!(data.len(), expect, "texel storage size mismatch");
        Self {
            data,
            dim,
            layout,
            component,
        }
    }

    /// Builds F32 storage from per-component floating point values.
    pub fn from_f32(values: &[f32], dim: (u32, u32), layout: PixelLayout) -> Self {
        let mut data = Vec::with_capacity(values.len() * 4);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        Self::new(data, dim, layout, ComponentType::F32)
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dim
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    #[inline]
    pub fn component_type(&self) -> ComponentType {
        self.component
    }

    /// Bytes per pixel component.
    #[inline]
    pub fn component_bytes(&self) -> usize {
        self.component.bytes()
    }

    /// Total size of the storage in bytes.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn component_offset(&self, x: u32, y: u32, c: usize) -> usize {
        ((y as usize * self.dim.0 as usize + x as usize) * self.layout.components() + c)
            * self.component.bytes()
    }

    /// Reads one native component. Integer components are normalised to
    /// `[0, 1]`; no colour decoding is applied here.
    pub fn read_component(&self, x: u32, y: u32, c: usize) -> Float {
        debug_assert!(x < self.dim.0 && y < self.dim.1 && c < self.layout.components());
        let o = self.component_offset(x, y, c);
        match self.component {
            ComponentType::U8 => unorm(self.data[o]),
            ComponentType::U16 => unorm(u16::from_le_bytes([self.data[o], self.data[o + 1]])),
            ComponentType::F16 => {
                f16::from_le_bytes([self.data[o], self.data[o + 1]]).to_f32() as Float
            }
            ComponentType::F32 => f32::from_le_bytes([
                self.data[o],
                self.data[o + 1],
                self.data[o + 2],
                self.data[o + 3],
            ]) as Float,
        }
    }
}
