//! Utilities: the fixed-size worker pool.

mod tpool;

pub use tpool::*;
