//! BSDFs: polarimetric bi-directional scattering distribution functions.

mod common;
mod composite;
mod dielectric;
mod diffuse;
mod mask;
mod normalmap;
mod scale;
mod surface_spm;
mod two_sided;

pub use common::*;
pub use composite::*;
pub use dielectric::*;
pub use diffuse::*;
pub use mask::*;
pub use normalmap::*;
pub use scale::*;
pub use surface_spm::*;
pub use two_sided::*;

use crate::interaction::SurfaceDifferentials;
use crate::math::{Dir3, Float, Frame, SolidAngleDensity, Wavenumber};
use crate::sampler::Sampler;
use crate::texture::TextureQuery;
use std::sync::Arc;

/// Generic BSDF interface. BSDFs quantify the interaction of light with an
/// interface; the polarimetric response is a Mueller operator.
pub trait Bsdf: Send + Sync {
    /// Constructs a shading frame in world space. Useful for BSDFs that
    /// perturb the shading frame, like normal maps.
    ///
    /// * `tquery`        - Texture query data.
    /// * `tangent_frame` - Mesh tangent frame at the intersection.
    /// * `ns`            - Interpolated shading normal at the intersection.
    fn shading_frame(
        &self,
        _tquery: &TextureQuery,
        tangent_frame: &SurfaceDifferentials,
        ns: &Dir3,
    ) -> Frame {
        Frame::build_shading_frame(ns, &tangent_frame.dpdu)
    }

    /// Spectral albedo. Returns `None` when the albedo cannot be computed.
    fn albedo(&self, k: Wavenumber) -> Option<Float>;

    /// Mask of all available lobes for this BSDF at a wavenumber.
    fn lobes(&self, k: Wavenumber) -> LobeMask;

    /// Count of lobes at a wavenumber.
    fn lobe_count(&self, k: Wavenumber) -> usize {
        self.lobes(k).count()
    }

    /// Does this BSDF comprise of only delta lobes?
    fn is_delta_only(&self, k: Wavenumber) -> bool;

    /// Is a lobe a delta lobe?
    fn is_delta_lobe(&self, k: Wavenumber, lobe: u32) -> bool;

    /// TRUE for BSDFs that make use of the surface interaction footprint.
    fn needs_interaction_footprint(&self) -> bool {
        false
    }

    /// Evaluates the BSDF. Accounts for the cosine foreshortening term;
    /// only non-delta lobes are evaluated. Implied units of 1/sr.
    ///
    /// * `wi` - Incident direction (local frame).
    /// * `wo` - Exitant direction (local frame).
    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult;

    /// Samples the BSDF. Returns `None` when no direction can be sampled.
    ///
    /// * `wi` - Incident direction (local frame).
    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample>;

    /// Sample solid-angle density of the non-delta lobes.
    ///
    /// * `wi` - Incident direction (local frame).
    /// * `wo` - Exitant direction (local frame).
    fn pdf(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> SolidAngleDensity;

    /// The refractive-index ratio: eta at exit over eta at entry.
    fn eta(&self, wi: &Dir3, wo: &Dir3, k: Wavenumber) -> Float;
}

/// Atomic reference counted `Bsdf`.
pub type ArcBsdf = Arc<dyn Bsdf>;

#[cfg(test)]
pub(crate) mod tests {
    use crate::interaction::{IntersectionSurface, SurfaceDifferentials};
    use crate::math::{Vec2, Vec3, Wavenumber};

    /// A flat +z surface interaction for BSDF unit tests.
    pub(crate) fn surface() -> IntersectionSurface {
        IntersectionSurface {
            p: Vec3::zero(),
            ng: Vec3::new(0.0, 0.0, 1.0),
            ns: Vec3::new(0.0, 0.0, 1.0),
            wo: Vec3::new(0.0, 0.0, 1.0),
            uv: Vec2::new(0.5, 0.5),
            tangent_frame: SurfaceDifferentials::default(),
            dist: 1.0,
            triangle: 0,
            front_face: true,
        }
    }

    pub(crate) fn arbitrary_k() -> Wavenumber {
        // ~550nm
        Wavenumber::from_inv_mm(11424.0)
    }
}
