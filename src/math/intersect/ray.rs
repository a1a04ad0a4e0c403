//! Ray kernels.

use crate::math::shapes::{Aabb, Ray};
use crate::math::simd::{BoolMask, Mask8, Vec3x8, F8};
use crate::math::{Float, Range, Vec2, Vec3};

/// A ray-triangle hit: distance and barycentric coordinates.
#[derive(Copy, Clone, Debug)]
pub struct RayTriHit {
    pub dist: Float,
    pub bary: Vec2,
}

/// 8-wide ray-triangle hits. Missing lanes carry a distance of −∞.
#[derive(Copy, Clone, Debug)]
pub struct RayTriHit8 {
    pub dist: F8,
    pub bary_x: F8,
    pub bary_y: F8,
}

/// 8-wide ray-AABB result.
#[derive(Copy, Clone, Debug)]
pub struct RayAabbHit8 {
    /// Per-lane slab entry distance.
    pub min_t: F8,
    pub mask: Mask8,
}

/// Kay-Kajiya slab test against a single AABB. Returns the parametric
/// overlap of the ray with the box, clipped to non-negative distances.
pub fn intersect_ray_aabb(ray: &Ray, aabb: &Aabb) -> Range {
    let mut tmin: Float = 0.0;
    let mut tmax = Float::INFINITY;
    for a in 0..3 {
        let inv = ray.invd[a];
        let mut t0 = (aabb.min[a] - ray.o[a]) * inv;
        let mut t1 = (aabb.max[a] - ray.o[a]) * inv;
        if inv < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        tmin = tmin.max(t0);
        tmax = tmax.min(t1);
    }
    Range::new(tmin, tmax)
}

/// Boolean slab test restricted to a range.
pub fn test_ray_aabb(ray: &Ray, aabb: &Aabb, range: &Range) -> bool {
    let r = intersect_ray_aabb(ray, aabb);
    !r.is_empty() && r.overlaps(range)
}

/// Kay-Kajiya slab test of one ray against eight AABBs at once, with
/// precomputed inverse direction.
pub fn intersect_ray_aabb_fast(
    ro: &Vec3x8,
    rinvd: &Vec3x8,
    aabb_min: &Vec3x8,
    aabb_max: &Vec3x8,
    range: &Range,
) -> RayAabbHit8 {
    // per component: entry at the near slab, exit at the far slab,
    // selected by the direction sign
    let signs = crate::math::simd::WideVec3Mask::from_signs(rinvd);
    let omin = *aabb_min - *ro;
    let omax = *aabb_max - *ro;
    let near = omin.blendv(&omax, &signs);
    let far = omax.blendv(&omin, &signs);
    let dmin = near * *rinvd;
    let dmax = far * *rinvd;

    let mut tmin = F8::splat(range.min.max(0.0));
    let mut tmax = F8::splat(range.max);
    tmin = tmin.max(&dmin.x);
    tmax = tmax.min(&dmax.x);
    tmin = tmin.max(&dmin.y);
    tmax = tmax.min(&dmax.y);
    tmin = tmin.max(&dmin.z);
    tmax = tmax.min(&dmax.z);

    RayAabbHit8 {
        min_t: tmin,
        mask: tmin.le(&tmax),
    }
}

/// Möller-Trumbore ray-triangle intersection. Back-face handling is the
/// caller's, driven by `dot(n, d)`.
pub fn intersect_ray_tri(
    ray: &Ray,
    a: &Vec3,
    b: &Vec3,
    c: &Vec3,
    range: &Range,
) -> Option<RayTriHit> {
    let e1 = *b - *a;
    let e2 = *c - *a;
    let pvec = ray.d.cross(&e2);
    let det = e1.dot(&pvec);
    if det.abs() < 1e-15 {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.o - *a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&e1);
    let v = ray.d.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = e2.dot(&qvec) * inv_det;
    if !range.contains(t) {
        return None;
    }

    Some(RayTriHit {
        dist: t,
        bary: Vec2::new(u, v),
    })
}

/// Möller-Trumbore against eight triangles. Miss lanes report −∞.
pub fn intersect_ray_tri_8w(
    ro: &Vec3x8,
    rd: &Vec3x8,
    a: &Vec3x8,
    b: &Vec3x8,
    c: &Vec3x8,
    range: &Range,
) -> RayTriHit8 {
    let e1 = *b - *a;
    let e2 = *c - *a;
    let pvec = rd.cross(&e2);
    let det = e1.dot(&pvec);

    let valid = det.abs().gt(&F8::splat(1e-15));
    let inv_det = F8::splat(1.0) / det;

    let tvec = *ro - *a;
    let u = tvec.dot(&pvec) * inv_det;
    let qvec = tvec.cross(&e1);
    let v = rd.dot(&qvec) * inv_det;
    let t = e2.dot(&qvec) * inv_det;

    let zero = F8::zero();
    let one = F8::splat(1.0);
    let in_tri = u.ge(&zero) & u.le(&one) & v.ge(&zero) & (u + v).le(&one);
    let in_range = t.ge(&F8::splat(range.min)) & t.le(&F8::splat(range.max));
    let hit = valid & in_tri & in_range;

    RayTriHit8 {
        dist: F8::splat(Float::NEG_INFINITY).blendv(&t, &hit),
        bary_x: u,
        bary_y: v,
    }
}

/// Boolean 8-wide ray-triangle test, for shadow batches.
pub fn test_ray_tri_8w(
    ro: &Vec3x8,
    rd: &Vec3x8,
    a: &Vec3x8,
    b: &Vec3x8,
    c: &Vec3x8,
    range: &Range,
    lanes: usize,
) -> BoolMask<8> {
    let hits = intersect_ray_tri_8w(ro, rd, a, b, c, range);
    let mut m = hits.dist.gt(&F8::splat(Float::NEG_INFINITY));
    // mask out padding lanes
    for l in lanes..8 {
        m.set(l, false);
    }
    m
}

/// Intersects the infinite line through `p0`/`p1` with a plane given by a
/// point and normal. Returns the line parameter.
pub fn intersect_line_plane(p0: &Vec3, p1: &Vec3, pp: &Vec3, pn: &Vec3) -> Option<Float> {
    let l = *p1 - *p0;
    let denom = l.dot(pn);
    if denom.abs() < 1e-15 {
        return None;
    }
    Some((*pp - *p0).dot(pn) / denom)
}

/// Intersects the segment `p0..p1` with a plane. Returns the intersection
/// point when the crossing lies inside the segment.
pub fn intersect_edge_plane(p0: &Vec3, p1: &Vec3, pp: &Vec3, pn: &Vec3) -> Option<Vec3> {
    let t = intersect_line_plane(p0, p1, pp, pn)?;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(*p0 + (*p1 - *p0) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tri() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn ray_tri_hit_and_bary() {
        let (a, b, c) = unit_tri();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersect_ray_tri(&ray, &a, &b, &c, &Range::new(0.0, 10.0)).unwrap();
        assert!((hit.dist - 1.0).abs() < 1e-9);
        assert!((hit.bary.x - 0.25).abs() < 1e-9);
        assert!((hit.bary.y - 0.25).abs() < 1e-9);
    }

    #[test]
    fn ray_tri_miss_outside() {
        let (a, b, c) = unit_tri();
        let ray = Ray::new(Vec3::new(0.9, 0.9, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect_ray_tri(&ray, &a, &b, &c, &Range::new(0.0, 10.0)).is_none());
        // behind the origin
        let back = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect_ray_tri(&back, &a, &b, &c, &Range::new(0.0, 10.0)).is_none());
    }

    #[test]
    fn wide_matches_scalar() {
        let (a, b, c) = unit_tri();
        let ray = Ray::new(Vec3::new(0.2, 0.3, 2.0), Vec3::new(0.05, -0.02, -1.0).normalize());
        let range = Range::new(0.0, 100.0);

        let wide = intersect_ray_tri_8w(
            &Vec3x8::splat(&ray.o),
            &Vec3x8::splat(&ray.d),
            &Vec3x8::splat(&a),
            &Vec3x8::splat(&b),
            &Vec3x8::splat(&c),
            &range,
        );
        let scalar = intersect_ray_tri(&ray, &a, &b, &c, &range).unwrap();
        for lane in 0..8 {
            assert!((wide.dist.read(lane) - scalar.dist).abs() < 1e-9);
            assert!((wide.bary_x.read(lane) - scalar.bary.x).abs() < 1e-9);
        }
    }

    #[test]
    fn ray_aabb_slabs() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let r = intersect_ray_aabb(&ray, &aabb);
        assert!((r.min - 4.0).abs() < 1e-9 && (r.max - 6.0).abs() < 1e-9);
        assert!(test_ray_aabb(&ray, &aabb, &Range::new(0.0, 10.0)));
        assert!(!test_ray_aabb(&ray, &aabb, &Range::new(0.0, 3.0)));
    }

    #[test]
    fn ray_aabb_8w_negative_direction() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mins = Vec3x8::splat(&Vec3::splat(-1.0));
        let maxs = Vec3x8::splat(&Vec3::splat(1.0));
        let r = intersect_ray_aabb_fast(
            &Vec3x8::splat(&ray.o),
            &Vec3x8::splat(&ray.invd),
            &mins,
            &maxs,
            &Range::new(0.0, 100.0),
        );
        assert!(r.mask.all());
        for lane in 0..8 {
            assert!((r.min_t.read(lane) - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn edge_plane() {
        let p = intersect_edge_plane(
            &Vec3::new(0.0, 0.0, -1.0),
            &Vec3::new(0.0, 0.0, 3.0),
            &Vec3::new(0.0, 0.0, 1.0),
            &Vec3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert!((p.z - 1.0).abs() < 1e-12);
        assert!(intersect_edge_plane(
            &Vec3::new(0.0, 0.0, 2.0),
            &Vec3::new(0.0, 0.0, 3.0),
            &Vec3::new(0.0, 0.0, 1.0),
            &Vec3::new(0.0, 0.0, 1.0),
        )
        .is_none());
    }
}
