//! Wide 3-vectors: `W` lanes per component.

use super::{BoolMask, WideF};
use crate::math::{Float, Vec3};
use std::ops::{Add, Mul, Sub};

#[derive(Copy, Clone, Debug)]
pub struct WideVec3<const W: usize> {
    pub x: WideF<W>,
    pub y: WideF<W>,
    pub z: WideF<W>,
}

impl<const W: usize> WideVec3<W> {
    /// Broadcasts one vector across all lanes.
    #[inline]
    pub fn splat(v: &Vec3) -> Self {
        Self {
            x: WideF::splat(v.x),
            y: WideF::splat(v.y),
            z: WideF::splat(v.z),
        }
    }

    /// Broadcasts a wide scalar into all three components.
    #[inline]
    pub fn splat_wide(v: &WideF<W>) -> Self {
        Self { x: *v, y: *v, z: *v }
    }

    /// Loads lanes from three component slices (SoA layout). Unaligned
    /// loads are permitted.
    #[inline]
    pub fn from_slices(xs: &[Float], ys: &[Float], zs: &[Float]) -> Self {
        Self {
            x: WideF::from_slice(xs),
            y: WideF::from_slice(ys),
            z: WideF::from_slice(zs),
        }
    }

    /// Reads one lane as a vector.
    #[inline]
    pub fn read(&self, lane: usize) -> Vec3 {
        Vec3::new(self.x.read(lane), self.y.read(lane), self.z.read(lane))
    }

    /// Writes one lane.
    #[inline]
    pub fn write(&mut self, lane: usize, v: &Vec3) {
        self.x.write(lane, v.x);
        self.y.write(lane, v.y);
        self.z.write(lane, v.z);
    }

    /// Per-lane dot product with another wide vector.
    #[inline]
    pub fn dot(&self, o: &Self) -> WideF<W> {
        self.x.mul_add(&o.x, &self.y.mul_add(&o.y, &(self.z * o.z)))
    }

    /// Per-lane dot product with a broadcast vector.
    #[inline]
    pub fn dot_scalar(&self, o: &Vec3) -> WideF<W> {
        self.x
            .mul_add(&WideF::splat(o.x), &self.y.mul_add(&WideF::splat(o.y), &(self.z * WideF::splat(o.z))))
    }

    /// Per-lane cross product.
    #[inline]
    pub fn cross(&self, o: &Self) -> Self {
        Self {
            x: self.y.mul_sub(&o.z, &(self.z * o.y)),
            y: self.z.mul_sub(&o.x, &(self.x * o.z)),
            z: self.x.mul_sub(&o.y, &(self.y * o.x)),
        }
    }

    /// Per-component blend: component lanes whose mask sign bit is set take
    /// `on_true`.
    #[inline]
    pub fn blendv(&self, on_true: &Self, mask: &WideVec3Mask<W>) -> Self {
        Self {
            x: self.x.blendv(&on_true.x, &mask.x),
            y: self.y.blendv(&on_true.y, &mask.y),
            z: self.z.blendv(&on_true.z, &mask.z),
        }
    }
}

impl WideVec3<4> {
    /// Packs up to four points into the four lanes; missing lanes are zero.
    #[inline]
    pub fn from_points(a: &Vec3, b: &Vec3, c: &Vec3, d: &Vec3) -> Self {
        Self {
            x: WideF([a.x, b.x, c.x, d.x]),
            y: WideF([a.y, b.y, c.y, d.y]),
            z: WideF([a.z, b.z, c.z, d.z]),
        }
    }
}

/// Per-component lane masks for a wide 3-vector.
#[derive(Copy, Clone, Debug)]
pub struct WideVec3Mask<const W: usize> {
    pub x: BoolMask<W>,
    pub y: BoolMask<W>,
    pub z: BoolMask<W>,
}

impl<const W: usize> WideVec3Mask<W> {
    /// Builds per-component masks from the sign bits of a wide vector
    /// (e.g. inverse ray directions).
    #[inline]
    pub fn from_signs(v: &WideVec3<W>) -> Self {
        Self {
            x: BoolMask::from_signs(&v.x.0),
            y: BoolMask::from_signs(&v.y.0),
            z: BoolMask::from_signs(&v.z.0),
        }
    }
}

impl<const W: usize> Add for WideVec3<W> {
    type Output = Self;
    #[inline]
    fn add(self, o: Self) -> Self {
        Self {
            x: self.x + o.x,
            y: self.y + o.y,
            z: self.z + o.z,
        }
    }
}

impl<const W: usize> Sub for WideVec3<W> {
    type Output = Self;
    #[inline]
    fn sub(self, o: Self) -> Self {
        Self {
            x: self.x - o.x,
            y: self.y - o.y,
            z: self.z - o.z,
        }
    }
}

impl<const W: usize> Mul<WideF<W>> for WideVec3<W> {
    type Output = Self;
    #[inline]
    fn mul(self, f: WideF<W>) -> Self {
        Self {
            x: self.x * f,
            y: self.y * f,
            z: self.z * f,
        }
    }
}

impl<const W: usize> Mul for WideVec3<W> {
    type Output = Self;
    #[inline]
    fn mul(self, o: Self) -> Self {
        Self {
            x: self.x * o.x,
            y: self.y * o.y,
            z: self.z * o.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_matches_scalar() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-0.5, 4.0, 2.0);
        let wa = WideVec3::<8>::splat(&a);
        let wb = WideVec3::<8>::splat(&b);
        let d = wa.dot(&wb);
        for i in 0..8 {
            assert!((d.read(i) - a.dot(&b)).abs() < 1e-12);
        }
    }

    #[test]
    fn cross_matches_scalar() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 4.0);
        let w = WideVec3::<4>::splat(&a).cross(&WideVec3::splat(&b));
        assert!((w.read(2) - a.cross(&b)).length() < 1e-12);
    }

    #[test]
    fn lane_read_write() {
        let mut w = WideVec3::<8>::splat(&Vec3::zero());
        w.write(5, &Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(w.read(5), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(w.read(4), Vec3::zero());
    }
}
