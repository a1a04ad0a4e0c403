//! Right-handed orthonormal frames.

use super::simd::WideVec3;
use super::{Dir3, Vec3};

/// An orthonormal basis `(t, b, n)` with `n = t × b`.
#[derive(Copy, Clone, Debug)]
pub struct Frame {
    pub t: Dir3,
    pub b: Dir3,
    pub n: Dir3,
}

impl Frame {
    /// Builds a frame around `n` using Duff's branchless orthonormal basis.
    pub fn from_normal(n: &Dir3) -> Self {
        let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        Self {
            t: Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
            b: Vec3::new(b, sign + n.y * n.y * a, -n.y),
            n: *n,
        }
    }

    /// Builds a shading frame from the interpolated shading normal and the
    /// surface tangent `dpdu`, Gram-Schmidt orthonormalised.
    pub fn build_shading_frame(ns: &Dir3, dpdu: &Vec3) -> Self {
        let t = *dpdu - *ns * ns.dot(dpdu);
        let l2 = t.length_squared();
        if l2 <= 1e-12 {
            return Self::from_normal(ns);
        }
        let t = t / l2.sqrt();
        Self {
            t,
            b: ns.cross(&t),
            n: *ns,
        }
    }

    /// Transforms a world vector into the frame.
    #[inline]
    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        Vec3::new(self.t.dot(v), self.b.dot(v), self.n.dot(v))
    }

    /// Transforms a local vector back into world space.
    #[inline]
    pub fn to_world(&self, v: &Vec3) -> Vec3 {
        self.t * v.x + self.b * v.y + self.n * v.z
    }

    /// Wide-vector variant of `to_local`.
    #[inline]
    pub fn to_local_wide<const W: usize>(&self, v: &WideVec3<W>) -> WideVec3<W> {
        WideVec3 {
            x: v.dot_scalar(&self.t),
            y: v.dot_scalar(&self.b),
            z: v.dot_scalar(&self.n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthonormal() {
        let n = Vec3::new(0.3, -0.4, 0.866_025_4).normalize();
        let f = Frame::from_normal(&n);
        assert!(f.t.dot(&f.b).abs() < 1e-6);
        assert!(f.t.dot(&f.n).abs() < 1e-6);
        assert!((f.t.length() - 1.0).abs() < 1e-6);
        assert!((f.t.cross(&f.b) - f.n).length() < 1e-6);
    }

    #[test]
    fn roundtrip() {
        let f = Frame::from_normal(&Vec3::new(0.0, 0.0, -1.0));
        let v = Vec3::new(0.2, 0.5, -0.7);
        let w = f.to_world(&f.to_local(&v));
        assert!((w - v).length() < 1e-12);
    }
}
