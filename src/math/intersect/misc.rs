//! Small geometric helpers shared by the cone kernels.

use crate::math::{sqr, Float, Vec2, Vec3};

/// Intersections of a segment with an origin-centred axis-aligned ellipse.
#[derive(Copy, Clone, Default, Debug)]
pub struct EdgeEllipseHit {
    /// Number of crossing points found (0..=2).
    pub points: u32,
    pub p0: Vec2,
    pub p1: Vec2,
}

/// Intersects the segment `p0..p1` with the ellipse `x²/a² + y²/b² = 1`.
pub fn intersect_edge_ellipse(p0: &Vec2, p1: &Vec2, a: Float, b: Float) -> EdgeEllipseHit {
    if a <= 0.0 || b <= 0.0 {
        return EdgeEllipseHit::default();
    }

    // scale into the unit circle
    let s0 = Vec2::new(p0.x / a, p0.y / b);
    let s1 = Vec2::new(p1.x / a, p1.y / b);
    let d = s1 - s0;

    let qa = d.length_squared();
    let qb = 2.0 * s0.dot(&d);
    let qc = s0.length_squared() - 1.0;

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 || qa == 0.0 {
        return EdgeEllipseHit::default();
    }

    let sq = disc.sqrt();
    let t0 = (-qb - sq) / (2.0 * qa);
    let t1 = (-qb + sq) / (2.0 * qa);

    let mut ret = EdgeEllipseHit::default();
    for t in [t0, t1] {
        if (0.0..=1.0).contains(&t) {
            let p = *p0 + (*p1 - *p0) * t;
            if ret.points == 0 {
                ret.p0 = p;
            } else {
                ret.p1 = p;
            }
            ret.points += 1;
        }
    }
    ret
}

/// Barycentric containment test of a point against a triangle; all four
/// points must be coplanar.
pub fn is_point_in_triangle(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    let v0 = *b - *a;
    let v1 = *c - *a;
    let v2 = *p - *a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - sqr(d01);
    if denom.abs() < 1e-20 {
        return false;
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    v >= 0.0 && w >= 0.0 && v + w <= 1.0
}
