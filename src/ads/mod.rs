//! Acceleration data structures over triangle soups.

mod triangle;

pub mod bvh8w;

pub use bvh8w::{Bvh8w, ConeIntersectionRecord, IntersectOpts};
pub use triangle::*;
