//! Axis-aligned bounding boxes.

use crate::math::{Dir3, Float, Vec3};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box.
    #[inline]
    pub fn null() -> Self {
        Self {
            min: Vec3::splat(Float::INFINITY),
            max: Vec3::splat(Float::NEG_INFINITY),
        }
    }

    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(pts: &[Vec3]) -> Self {
        let mut b = Self::null();
        for p in pts {
            b.expand(p);
        }
        b
    }

    #[inline]
    pub fn expand(&mut self, p: &Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn union(&self, o: &Self) -> Self {
        Self {
            min: self.min.min(&o.min),
            max: self.max.max(&o.max),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn centre(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn diameter(&self) -> Float {
        self.extent().length()
    }

    #[inline]
    pub fn contains(&self, p: &Vec3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Axis with the largest extent.
    pub fn largest_axis(&self) -> usize {
        let e = self.extent();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    /// A corner vertex by index; bit 0 selects max x, bit 1 max y, bit 2
    /// max z.
    #[inline]
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(
            if i & 1 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    /// Outward normal of face `i` under the ordering −z,+z,−y,+y,−x,+x.
    #[inline]
    pub fn face_normal(i: usize) -> Dir3 {
        match i {
            0 => Vec3::new(0.0, 0.0, -1.0),
            1 => Vec3::new(0.0, 0.0, 1.0),
            2 => Vec3::new(0.0, -1.0, 0.0),
            3 => Vec3::new(0.0, 1.0, 0.0),
            4 => Vec3::new(-1.0, 0.0, 0.0),
            _ => Vec3::new(1.0, 0.0, 0.0),
        }
    }

    /// A vertex lying on face `i` (same ordering as `face_normal`).
    #[inline]
    pub fn face_vertex(&self, i: usize) -> Vec3 {
        const FACE_V0: [usize; 6] = [0, 4, 0, 2, 0, 1];
        self.vertex(FACE_V0[i])
    }
}
