//! Rays.

use crate::math::{Dir3, Float, Vec3};

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub o: Vec3,
    /// Direction.
    pub d: Dir3,

    /// Precomputed reciprocal direction.
    pub invd: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Dir3) -> Self {
        Self {
            o: origin,
            d: direction,
            invd: Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z),
        }
    }

    /// Position at distance `dist` along the ray.
    #[inline]
    pub fn propagate(&self, dist: Float) -> Vec3 {
        self.o + self.d * dist
    }
}
