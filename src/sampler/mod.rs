//! Random sampling: the sampler abstraction, measures and density helpers.

mod measure;
mod uniform;
mod warp;

pub use measure::*;
pub use uniform::*;
pub use warp::*;

use crate::math::{Float, Vec2};

/// Source of canonical random numbers. Each worker owns an independent
/// instance; the renderer makes no cross-thread determinism guarantees.
pub trait Sampler: Send {
    /// A canonical uniform sample in `[0, 1)`.
    fn r(&mut self) -> Float;

    /// Two canonical uniform samples.
    fn r2(&mut self) -> Vec2 {
        Vec2::new(self.r(), self.r())
    }

    /// A standard-normal distributed sample.
    fn normal(&mut self) -> Float;
}
