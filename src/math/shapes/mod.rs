//! Geometric shapes used by queries and traversal.

mod aabb;
mod ball;
mod elliptic_cone;
mod ray;

pub use aabb::*;
pub use ball::*;
pub use elliptic_cone::*;
pub use ray::*;
