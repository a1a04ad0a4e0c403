//! Triangles.

use crate::math::shapes::Aabb;
use crate::math::{Dir3, Float, Vec2, Vec3};

/// A scene triangle: positions, geometric normal, optional shading
/// attributes and the material it resolves to.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    /// Geometric normal.
    pub n: Dir3,
    /// Per-vertex shading normals, when the mesh provides them.
    pub shading_normals: Option<[Dir3; 3]>,
    /// Per-vertex uv coordinates, when the mesh provides them.
    pub uvs: Option<[Vec2; 3]>,
    /// Material index into the scene's BSDF table.
    pub material: u32,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, material: u32) -> Self {
        let n = (b - a).cross(&(c - a));
        let len = n.length();
        Self {
            a,
            b,
            c,
            n: if len > 0.0 { n / len } else { Dir3::new(0.0, 0.0, 1.0) },
            shading_normals: None,
            uvs: None,
            material,
        }
    }

    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_shading_normals(mut self, normals: [Dir3; 3]) -> Self {
        self.shading_normals = Some(normals);
        self
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&[self.a, self.b, self.c])
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    #[inline]
    pub fn area(&self) -> Float {
        (self.b - self.a).cross(&(self.c - self.a)).length() * 0.5
    }

    /// Position at barycentric coordinates `(u, v)` (weights of b and c).
    #[inline]
    pub fn position(&self, bary: &Vec2) -> Vec3 {
        self.a * (1.0 - bary.x - bary.y) + self.b * bary.x + self.c * bary.y
    }

    /// Interpolated shading normal; falls back to the geometric normal.
    pub fn shading_normal(&self, bary: &Vec2) -> Dir3 {
        match &self.shading_normals {
            Some([na, nb, nc]) => {
                (*na * (1.0 - bary.x - bary.y) + *nb * bary.x + *nc * bary.y).normalize()
            }
            None => self.n,
        }
    }

    /// Interpolated uv; defaults to the barycentrics themselves.
    pub fn uv(&self, bary: &Vec2) -> Vec2 {
        match &self.uvs {
            Some([ta, tb, tc]) => {
                *ta * (1.0 - bary.x - bary.y) + *tb * bary.x + *tc * bary.y
            }
            None => *bary,
        }
    }

    /// Barycentric coordinates of a point (assumed near the triangle's
    /// plane).
    pub fn barycentric_of_point(&self, p: &Vec3) -> Vec2 {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = *p - self.a;
        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-20 {
            return Vec2::new(0.0, 0.0);
        }
        Vec2::new(
            (d11 * d20 - d01 * d21) / denom,
            (d00 * d21 - d01 * d20) / denom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_and_area() {
        let t = Triangle::new(
            Vec3::zero(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            0,
        );
        assert!((t.n - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!((t.area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn barycentric_roundtrip() {
        let t = Triangle::new(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.0, 2.0, 1.0),
            0,
        );
        let bary = Vec2::new(0.3, 0.5);
        let p = t.position(&bary);
        let back = t.barycentric_of_point(&p);
        assert!((back - bary).length() < 1e-9);
    }
}
