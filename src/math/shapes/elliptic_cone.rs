//! Elliptic cones.
//!
//! A generalised cone with an elliptical cross-section, used to model beam
//! sweeps. In the cone's local frame the axis is +z and a point is
//! contained when `x² + (e·y)² ≤ (x0 + tanα·z)²`: the cross-section at
//! distance `z` has semi-axes `(x0 + tanα·z, (x0 + tanα·z)/e)`.

use super::Ray;
use crate::math::simd::{BoolMask, WideF, WideVec3};
use crate::math::{Dir3, Float, Frame, Range, Vec2, Vec3};

#[derive(Copy, Clone, Debug)]
pub struct EllipticCone {
    origin: Vec3,
    frame: Frame,
    axis_ray: Ray,

    /// Cross-section x semi-axis at z = 0.
    x0: Float,
    /// Aperture growth per unit z.
    tan_alpha: Float,
    /// Ellipticity: the y semi-axis is the x semi-axis over `e`.
    e: Float,
}

impl EllipticCone {
    pub fn new(origin: Vec3, d: Dir3, x0: Float, tan_alpha: Float, e: Float) -> Self {
        debug_assert!(x0 >= 0.0 && tan_alpha >= 0.0 && e >= 1.0);
        Self {
            origin,
            frame: Frame::from_normal(&d),
            axis_ray: Ray::new(origin, d),
            x0,
            tan_alpha,
            e,
        }
    }

    /// A circular cone.
    pub fn circular(origin: Vec3, d: Dir3, x0: Float, tan_alpha: Float) -> Self {
        Self::new(origin, d, x0, tan_alpha, 1.0)
    }

    /// The degenerate zero-aperture cone equivalent to `ray`.
    pub fn from_ray(ray: &Ray) -> Self {
        Self::new(ray.o, ray.d, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn o(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn d(&self) -> Dir3 {
        self.axis_ray.d
    }

    /// The cone's local frame; +z is the axis.
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The axis as a ray.
    #[inline]
    pub fn ray(&self) -> &Ray {
        &self.axis_ray
    }

    #[inline]
    pub fn x0(&self) -> Float {
        self.x0
    }

    #[inline]
    pub fn tan_alpha(&self) -> Float {
        self.tan_alpha
    }

    #[inline]
    pub fn e(&self) -> Float {
        self.e
    }

    #[inline]
    pub fn one_over_e(&self) -> Float {
        1.0 / self.e
    }

    /// The z position of the cone's apex (where the cross-section shrinks
    /// to a point); −∞ for cylinders.
    #[inline]
    pub fn z_apex(&self) -> Float {
        if self.tan_alpha > 0.0 {
            -self.x0 / self.tan_alpha
        } else {
            Float::NEG_INFINITY
        }
    }

    /// TRUE when the cone degenerates to its axis ray.
    #[inline]
    pub fn is_ray(&self) -> bool {
        self.x0 == 0.0 && self.tan_alpha == 0.0
    }

    /// Cross-section semi-axes at distance `z` along the axis.
    #[inline]
    pub fn axes(&self, z: Float) -> Vec2 {
        let rx = (self.x0 + self.tan_alpha * z).max(0.0);
        Vec2::new(rx, rx / self.e)
    }

    /// Containment test for a point in the cone's local frame, restricted
    /// to a z range.
    #[inline]
    pub fn contains_local_point(&self, p: &Vec3, range: &Range) -> bool {
        if p.z < self.z_apex() || p.z < range.min || p.z > range.max {
            return false;
        }
        let cs = self.x0 + self.tan_alpha * p.z;
        let ey = self.e * p.y;
        p.x * p.x + ey * ey <= cs * cs
    }

    /// Wide containment test for `W` local points.
    pub fn contains_local<const W: usize>(
        &self,
        p: &WideVec3<W>,
        range: &Range,
    ) -> BoolMask<W> {
        let cs = p.z.mul_add(&WideF::splat(self.tan_alpha), &WideF::splat(self.x0));
        let ey = p.y * WideF::splat(self.e);
        let lhs = p.x.mul_add(&p.x, &(ey * ey));
        let inside = lhs.le(&(cs * cs));

        let zmin = WideF::splat(self.z_apex().max(range.min));
        let zmax = WideF::splat(range.max);
        inside & p.z.ge(&zmin) & p.z.le(&zmax)
    }
}
