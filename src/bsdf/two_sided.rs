//! Two-sided BSDF adaptor.

use super::{ArcBsdf, Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask};
use crate::interaction::SurfaceDifferentials;
use crate::math::{Dir3, Float, Frame, SolidAngleDensity, Wavenumber};
use crate::sampler::Sampler;
use crate::texture::TextureQuery;

/// Mirrors the nested BSDF across the interface when queried from below
/// (`wi.z < 0`), flipping `eta` accordingly.
pub struct TwoSidedBsdf {
    nested: ArcBsdf,
}

impl TwoSidedBsdf {
    pub fn new(nested: ArcBsdf) -> Self {
        Self { nested }
    }

    #[inline]
    pub fn nested_bsdf(&self) -> &ArcBsdf {
        &self.nested
    }

    #[inline]
    fn flip(w: &Dir3) -> Dir3 {
        Dir3::new(w.x, w.y, -w.z)
    }
}

impl Bsdf for TwoSidedBsdf {
    fn shading_frame(
        &self,
        tquery: &TextureQuery,
        tangent_frame: &SurfaceDifferentials,
        ns: &Dir3,
    ) -> Frame {
        self.nested.shading_frame(tquery, tangent_frame, ns)
    }

    fn albedo(&self, k: Wavenumber) -> Option<Float> {
        self.nested.albedo(k)
    }

    fn lobes(&self, k: Wavenumber) -> LobeMask {
        self.nested.lobes(k)
    }

    fn is_delta_only(&self, k: Wavenumber) -> bool {
        self.nested.is_delta_only(k)
    }

    fn is_delta_lobe(&self, k: Wavenumber, lobe: u32) -> bool {
        self.nested.is_delta_lobe(k, lobe)
    }

    fn needs_interaction_footprint(&self) -> bool {
        self.nested.needs_interaction_footprint()
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        if wi.z < 0.0 {
            self.nested.f(&Self::flip(wi), &Self::flip(wo), query)
        } else {
            self.nested.f(wi, wo, query)
        }
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        if wi.z < 0.0 {
            let mut s = self.nested.sample(&Self::flip(wi), query, sampler)?;
            s.wo = Self::flip(&s.wo);
            if s.eta != 0.0 {
                s.eta = 1.0 / s.eta;
            }
            Some(s)
        } else {
            self.nested.sample(wi, query, sampler)
        }
    }

    fn pdf(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> SolidAngleDensity {
        if wi.z < 0.0 {
            self.nested.pdf(&Self::flip(wi), &Self::flip(wo), query)
        } else {
            self.nested.pdf(wi, wo, query)
        }
    }

    fn eta(&self, wi: &Dir3, wo: &Dir3, k: Wavenumber) -> Float {
        if wi.z < 0.0 {
            let e = self.nested.eta(&Self::flip(wi), &Self::flip(wo), k);
            if e != 0.0 {
                1.0 / e
            } else {
                e
            }
        } else {
            self.nested.eta(wi, wo, k)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::tests::{arbitrary_k, surface};
    use crate::bsdf::{DiffuseBsdf, Transport};
    use crate::sampler::UniformSampler;
    use crate::texture::ConstantTexture;
    use std::sync::Arc;

    #[test]
    fn mirrored_evaluation() {
        let inner = Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(0.8))));
        let b = TwoSidedBsdf::new(inner.clone());
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);

        let wi = Dir3::new(0.1, 0.2, 0.97).normalize();
        let wo = Dir3::new(-0.3, 0.1, 0.95).normalize();
        let flip = |w: &Dir3| Dir3::new(w.x, w.y, -w.z);

        // two_sided(inner) at (−wi, −wo) equals inner at (wi, wo)
        let a = b.f(&flip(&wi), &flip(&wo), &q).mean_intensity();
        let e = inner.f(&wi, &wo, &q).mean_intensity();
        assert!((a - e).abs() < 1e-12);
        assert!((b.pdf(&flip(&wi), &flip(&wo), &q) - inner.pdf(&wi, &wo, &q)).abs() < 1e-12);
    }

    #[test]
    fn below_surface_sampling_flips_back() {
        let b = TwoSidedBsdf::new(Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(
            0.5,
        )))));
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let mut s = UniformSampler::new(55);
        let below = Dir3::new(0.0, 0.0, -1.0);
        for _ in 0..100 {
            let smp = b.sample(&below, &q, &mut s).unwrap();
            // reflected samples stay in the lower hemisphere
            assert!(smp.wo.z < 0.0);
        }
    }
}
