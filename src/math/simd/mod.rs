//! Wide (4- or 8-lane) vectors with a scalar emulation engine.
//!
//! A lane is one independent datum (e.g. one triangle or one AABB); `N`
//! components stack lanes into wide 3-vectors. Comparison results are
//! carried as lanes whose **sign bit** encodes true; readers must test via
//! the sign bit, never by comparing against zero.

mod bool_mask;
mod wide;
mod wide_vec3;

pub use bool_mask::*;
pub use wide::*;
pub use wide_vec3::*;

/// 8-lane scalar.
pub type F8 = WideF<8>;
/// 4-lane scalar.
pub type F4 = WideF<4>;
/// 8-lane 3-vector.
pub type Vec3x8 = WideVec3<8>;
/// 4-lane 3-vector.
pub type Vec3x4 = WideVec3<4>;
/// 8-lane boolean mask.
pub type Mask8 = BoolMask<8>;
/// 4-lane boolean mask.
pub type Mask4 = BoolMask<4>;
