//! Lambertian diffuse BSDF.

use super::{Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask, SolidAngleSample};
use crate::interaction::MuellerOperator;
use crate::math::{Dir3, Float, SolidAngleDensity, Wavenumber, INV_PI};
use crate::sampler::{cosine_hemisphere_pdf, square_to_cosine_hemisphere, Sampler};
use crate::texture::ArcTexture;

/// Idealized Lambertian (perfectly-diffusing) interface. Admits no
/// transmission: all light is diffusely scattered into the upper
/// hemisphere, fully depolarised.
pub struct DiffuseBsdf {
    refl: ArcTexture,
}

impl DiffuseBsdf {
    pub fn new(reflectance: ArcTexture) -> Self {
        Self { refl: reflectance }
    }
}

impl Bsdf for DiffuseBsdf {
    fn albedo(&self, k: Wavenumber) -> Option<Float> {
        self.refl.mean_value(k)
    }

    fn lobes(&self, _k: Wavenumber) -> LobeMask {
        LobeMask::lobe(0)
    }

    fn is_delta_only(&self, _k: Wavenumber) -> bool {
        false
    }

    fn is_delta_lobe(&self, _k: Wavenumber, _lobe: u32) -> bool {
        false
    }

    fn needs_interaction_footprint(&self) -> bool {
        self.refl.needs_interaction_footprint()
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        if wi.z <= 0.0 || wo.z <= 0.0 || !query.lobes.test(0) {
            return BsdfResult::zero();
        }
        let tquery = query.intersection.texture_query(query.k);
        let refl = self.refl.f(&tquery);
        BsdfResult {
            m: MuellerOperator::depolariser(refl * INV_PI * wo.z),
        }
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        if wi.z <= 0.0 || !query.lobes.test(0) {
            return None;
        }

        let wo = square_to_cosine_hemisphere(sampler.r2());
        let pdf = cosine_hemisphere_pdf(wo.z);
        if pdf <= 0.0 {
            return None;
        }

        let tquery = query.intersection.texture_query(query.k);
        let refl = self.refl.f(&tquery);

        Some(BsdfSample {
            wo,
            dpd: SolidAngleSample::continuous(pdf),
            eta: 1.0,
            lobe: LobeMask::lobe(0),
            // f/pdf = refl: the cosine and 1/π cancel
            weighted_bsdf: BsdfResult {
                m: MuellerOperator::depolariser(refl),
            },
        })
    }

    fn pdf(&self, wi: &Dir3, wo: &Dir3, _query: &BsdfQuery) -> SolidAngleDensity {
        if wi.z <= 0.0 || wo.z <= 0.0 {
            0.0
        } else {
            cosine_hemisphere_pdf(wo.z)
        }
    }

    fn eta(&self, _wi: &Dir3, _wo: &Dir3, _k: Wavenumber) -> Float {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::tests::{arbitrary_k, surface};
    use crate::bsdf::Transport;
    use crate::sampler::UniformSampler;
    use crate::texture::ConstantTexture;
    use std::sync::Arc;

    #[test]
    fn sample_pdf_consistency() {
        let b = DiffuseBsdf::new(Arc::new(ConstantTexture::new(0.5)));
        let isect = surface();
        let query = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.3, -0.2, 0.93).normalize();
        let mut s = UniformSampler::new(77);

        for _ in 0..1000 {
            let smp = b.sample(&wi, &query, &mut s).unwrap();
            let pdf = b.pdf(&wi, &smp.wo, &query);
            assert!((pdf - smp.dpd.density).abs() < 1e-9);
            // weighted = f/pdf
            let f = b.f(&wi, &smp.wo, &query);
            assert!(
                (f.mean_intensity() / pdf - smp.weighted_bsdf.mean_intensity()).abs() < 1e-9
            );
        }
    }

    #[test]
    fn white_furnace() {
        // with unit reflectance, the weighted sample intensity is 1
        let b = DiffuseBsdf::new(Arc::new(ConstantTexture::new(1.0)));
        let isect = surface();
        let query = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.0, 0.0, 1.0);
        let mut s = UniformSampler::new(3);
        let smp = b.sample(&wi, &query, &mut s).unwrap();
        assert!((smp.weighted_bsdf.mean_intensity() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_transmission() {
        let b = DiffuseBsdf::new(Arc::new(ConstantTexture::new(0.5)));
        let isect = surface();
        let query = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let below = Dir3::new(0.0, 0.0, -1.0);
        let mut s = UniformSampler::new(3);
        assert!(b.sample(&below, &query, &mut s).is_none());
        let up = Dir3::new(0.0, 0.0, 1.0);
        assert_eq!(b.f(&up, &below, &query).mean_intensity(), 0.0);
        assert_eq!(b.pdf(&up, &below, &query), 0.0);
    }
}
