//! Surface intersection records handed to BSDF evaluation.

use crate::math::{Dir3, Frame, Vec2, Vec3, Wavenumber};
use crate::texture::TextureQuery;

/// Mesh tangent frame at an intersection.
#[derive(Copy, Clone, Debug)]
pub struct SurfaceDifferentials {
    /// Partial derivative of the position w.r.t. `u`.
    pub dpdu: Vec3,
    /// Partial derivative of the position w.r.t. `v`.
    pub dpdv: Vec3,
}

impl Default for SurfaceDifferentials {
    fn default() -> Self {
        Self {
            dpdu: Vec3::new(1.0, 0.0, 0.0),
            dpdv: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Geometry of a particular point on a surface, as produced by ADS queries
/// and consumed by BSDF evaluation.
#[derive(Copy, Clone, Debug)]
pub struct IntersectionSurface {
    /// World-space position.
    pub p: Vec3,
    /// Geometric normal.
    pub ng: Dir3,
    /// Interpolated shading normal.
    pub ns: Dir3,
    /// Outgoing (towards the previous vertex) world direction.
    pub wo: Dir3,
    /// Surface parametrisation at the hit.
    pub uv: Vec2,
    /// Mesh tangent frame.
    pub tangent_frame: SurfaceDifferentials,
    /// Distance along the query ray.
    pub dist: crate::math::Float,
    /// Triangle id of the hit.
    pub triangle: u32,
    /// TRUE when the geometric front face was hit.
    pub front_face: bool,
}

impl IntersectionSurface {
    /// The geometric frame at the hit.
    #[inline]
    pub fn geo_frame(&self) -> Frame {
        Frame::from_normal(&self.ng)
    }

    /// Texture query data at the hit for wavenumber `k`.
    #[inline]
    pub fn texture_query(&self, k: Wavenumber) -> TextureQuery {
        TextureQuery { uv: self.uv, k }
    }
}
