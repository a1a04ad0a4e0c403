//! Balls (solid spheres) for spatial overlap queries.

use crate::math::{Float, Vec3};

#[derive(Copy, Clone, Debug)]
pub struct Ball {
    pub centre: Vec3,
    pub radius: Float,
}

impl Ball {
    pub fn new(centre: Vec3, radius: Float) -> Self {
        debug_assert!(radius >= 0.0);
        Self { centre, radius }
    }

    #[inline]
    pub fn contains(&self, p: &Vec3) -> bool {
        (*p - self.centre).length_squared() <= self.radius * self.radius
    }
}
