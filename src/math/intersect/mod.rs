//! Intersection kernels: ray, elliptic-cone and ball versus triangle,
//! AABB and plane, in scalar and 8-wide forms.
//!
//! Every kernel accepts a closed interval `[tmin, tmax]` along the query
//! axis. In the 8-wide forms a lane represents a distinct triangle or AABB.

mod ball;
mod cone;
mod misc;
mod ray;

pub use ball::*;
pub use cone::*;
pub use misc::*;
pub use ray::*;
