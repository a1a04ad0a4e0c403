//! Light-matter interaction: polarimetric state, Fresnel amplitudes and
//! surface intersections.

mod fresnel;
mod intersection;
mod mueller;
mod stokes;

pub use fresnel::*;
pub use intersection::*;
pub use mueller::*;
pub use stokes::*;
