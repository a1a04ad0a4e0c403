//! Spectral, polarimetric light-transport renderer core.
//!
//! Light is parameterised by wavenumber `k = 2π/λ`, polarisation state is
//! carried as Stokes vectors, and scattering is expressed through Mueller
//! operators. Scenes are triangle soups accelerated by an 8-wide BVH that
//! answers ray, elliptic-cone and ball queries. Rendering is driven by a
//! block scheduler over a fixed-size worker pool.

pub mod ads;
pub mod bitmap;
pub mod bsdf;
pub mod emitter;
pub mod integrator;
pub mod interaction;
pub mod loader;
pub mod math;
pub mod sampler;
pub mod scene;
pub mod sensor;
pub mod spectrum;
pub mod stats;
pub mod texture;
pub mod util;

mod error;

pub use error::Error;

/// Result alias for construction-time fallible operations.
pub type Result<T> = std::result::Result<T, Error>;
