//! Warps from the unit square to sampling domains.

use crate::math::{Float, Vec2, Vec3, INV_PI, PI};

/// Maps the unit square to the unit disk with the concentric mapping.
pub fn square_to_concentric_disk(u: Vec2) -> Vec2 {
    let o = u * 2.0 - Vec2::new(1.0, 1.0);
    if o.x == 0.0 && o.y == 0.0 {
        return Vec2::new(0.0, 0.0);
    }
    let (r, theta) = if o.x.abs() > o.y.abs() {
        (o.x, PI / 4.0 * (o.y / o.x))
    } else {
        (o.y, PI / 2.0 - PI / 4.0 * (o.x / o.y))
    };
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Maps the unit square to cosine-weighted directions on the +z hemisphere.
pub fn square_to_cosine_hemisphere(u: Vec2) -> Vec3 {
    let d = square_to_concentric_disk(u);
    let z = (1.0 - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vec3::new(d.x, d.y, z)
}

/// Density of `square_to_cosine_hemisphere`, `cosθ/π`.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta.max(0.0) * INV_PI
}
