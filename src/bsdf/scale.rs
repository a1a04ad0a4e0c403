//! Scaled BSDF adaptor.

use super::{ArcBsdf, Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask};
use crate::interaction::SurfaceDifferentials;
use crate::math::{Dir3, Float, Frame, SolidAngleDensity, Wavenumber};
use crate::sampler::Sampler;
use crate::texture::{ArcTexture, TextureQuery};

/// Scales the nested BSDF by a supplied texture. The pdf and eta pass
/// through unchanged.
pub struct ScaleBsdf {
    scale: ArcTexture,
    nested: ArcBsdf,
}

impl ScaleBsdf {
    pub fn new(scale: ArcTexture, nested: ArcBsdf) -> Self {
        Self { scale, nested }
    }

    #[inline]
    pub fn nested_bsdf(&self) -> &ArcBsdf {
        &self.nested
    }
}

impl Bsdf for ScaleBsdf {
    fn shading_frame(
        &self,
        tquery: &TextureQuery,
        tangent_frame: &SurfaceDifferentials,
        ns: &Dir3,
    ) -> Frame {
        self.nested.shading_frame(tquery, tangent_frame, ns)
    }

    /// Approximate: the product of the nested albedo and the mean scale.
    fn albedo(&self, k: Wavenumber) -> Option<Float> {
        let nested = self.nested.albedo(k)?;
        let scale = self.scale.mean_value(k)?;
        Some(nested * scale)
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
        self.nested.needs_interaction_footprint() || self.scale.needs_interaction_footprint()
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        let tquery = query.intersection.texture_query(query.k);
        let mut ret = self.nested.f(wi, wo, query);
        ret.m *= self.scale.f(&tquery);
        ret
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        let tquery = query.intersection.texture_query(query.k);
        let mut s = self.nested.sample(wi, query, sampler)?;
        s.weighted_bsdf.m *= self.scale.f(&tquery);
        Some(s)
    }

    fn pdf(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> SolidAngleDensity {
        self.nested.pdf(wi, wo, query)
    }

    fn eta(&self, wi: &Dir3, wo: &Dir3, k: Wavenumber) -> Float {
        self.nested.eta(wi, wo, k)
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
    fn scales_f_and_sample_weight() {
        let inner = Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(0.8))));
        let b = ScaleBsdf::new(Arc::new(ConstantTexture::new(0.5)), inner.clone());
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.0, 0.0, 1.0);
        let wo = Dir3::new(0.3, 0.0, 0.954).normalize();

        assert!(
            (b.f(&wi, &wo, &q).mean_intensity() - 0.5 * inner.f(&wi, &wo, &q).mean_intensity())
                .abs()
                < 1e-12
        );
        // pdf unchanged
        assert_eq!(b.pdf(&wi, &wo, &q), inner.pdf(&wi, &wo, &q));

        let mut s = UniformSampler::new(2);
        let smp = b.sample(&wi, &q, &mut s).unwrap();
        assert!((smp.weighted_bsdf.mean_intensity() - 0.8 * 0.5).abs() < 1e-9);
        assert_eq!(b.albedo(arbitrary_k()), Some(0.8 * 0.5));
    }
}
