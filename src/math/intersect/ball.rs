//! Ball overlap kernels.

use crate::math::shapes::Ball;
use crate::math::simd::{Mask8, Vec3x8, F8};

/// Tests a ball against eight AABBs: per lane, the squared distance from
/// the centre to the clamped closest box point against `r²`.
pub fn test_ball_aabb(ball: &Ball, aabb_min: &Vec3x8, aabb_max: &Vec3x8) -> Mask8 {
    let c = Vec3x8::splat(&ball.centre);
    let closest = Vec3x8 {
        x: c.x.clamp(&aabb_min.x, &aabb_max.x),
        y: c.y.clamp(&aabb_min.y, &aabb_max.y),
        z: c.z.clamp(&aabb_min.z, &aabb_max.z),
    };
    let d = closest - c;
    d.dot(&d).le(&F8::splat(ball.radius * ball.radius))
}

/// Conservative ball-triangle overlap test against eight triangles: the
/// plane distance must be within the radius and the ball must overlap the
/// triangle's bounding box. May report false positives near corners.
pub fn test_ball_tri(
    ball: &Ball,
    a: &Vec3x8,
    b: &Vec3x8,
    c: &Vec3x8,
    n: &Vec3x8,
) -> Mask8 {
    let centre = Vec3x8::splat(&ball.centre);
    let r = F8::splat(ball.radius);

    // distance to the supporting plane
    let nn = n.dot(n).sqrt().max(&F8::splat(1e-30));
    let plane_dist = (centre - *a).dot(n).abs() / nn;
    let near_plane = plane_dist.le(&r);

    // ball vs triangle bounding box
    let tmin = Vec3x8 {
        x: a.x.min(&b.x).min(&c.x),
        y: a.y.min(&b.y).min(&c.y),
        z: a.z.min(&b.z).min(&c.z),
    };
    let tmax = Vec3x8 {
        x: a.x.max(&b.x).max(&c.x),
        y: a.y.max(&b.y).max(&c.y),
        z: a.z.max(&b.z).max(&c.z),
    };
    let box_overlap = test_ball_aabb(ball, &tmin, &tmax);

    near_plane & box_overlap
}
