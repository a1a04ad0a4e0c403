//! Opacity-masked BSDF adaptor.

use super::{ArcBsdf, Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask, SolidAngleSample};
use crate::interaction::{MuellerOperator, SurfaceDifferentials};
use crate::math::{Dir3, Float, Frame, SolidAngleDensity, Wavenumber};
use crate::sampler::Sampler;
use crate::texture::{ArcTexture, TextureQuery};
use crate::{Error, Result};

/// Masks the nested BSDF using the opacity of the supplied texture.
/// Masked samples take a null delta lobe (perfect forward "transmission"),
/// selected with probability `1 − opacity`. Transmissive nested BSDFs are
/// not supported.
pub struct MaskBsdf {
    mask: ArcTexture,
    nested: ArcBsdf,
    null_lobe: u32,
}

impl MaskBsdf {
    pub fn new(mask: ArcTexture, nested: ArcBsdf) -> Result<Self> {
        // reject transmissive nested BSDFs: a relative IOR != 1 across the
        // interface implies refraction through the mask
        let probe_k = Wavenumber::from_inv_mm(1.0);
        let up = Dir3::new(0.0, 0.0, 1.0);
        let dn = Dir3::new(0.0, 0.0, -1.0);
        if (nested.eta(&up, &dn, probe_k) - 1.0).abs() > 1e-6 {
            return Err(Error::MaskedTransmissive);
        }

        // the null transmission lobe takes the highest free slot
        let null_lobe = nested
            .lobes(probe_k)
            .highest_free()
            .ok_or(Error::NoFreeLobe)?;

        Ok(Self {
            mask,
            nested,
            null_lobe,
        })
    }

    #[inline]
    fn opacity(&self, tquery: &TextureQuery) -> Float {
        self.mask.f(tquery).clamp(0.0, 1.0)
    }
}

impl Bsdf for MaskBsdf {
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
        let mut lobes = self.nested.lobes(k);
        lobes.set(self.null_lobe);
        lobes
    }

    fn is_delta_only(&self, k: Wavenumber) -> bool {
        self.nested.is_delta_only(k)
    }

    fn is_delta_lobe(&self, k: Wavenumber, lobe: u32) -> bool {
        if lobe == self.null_lobe {
            return true;
        }
        self.nested.is_delta_lobe(k, lobe)
    }

    fn needs_interaction_footprint(&self) -> bool {
        self.nested.needs_interaction_footprint() || self.mask.needs_interaction_footprint()
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        let tquery = query.intersection.texture_query(query.k);
        let mut ret = self.nested.f(wi, wo, query);
        ret.m *= self.opacity(&tquery);
        ret
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        let tquery = query.intersection.texture_query(query.k);
        let opacity = self.opacity(&tquery);

        if sampler.r() >= opacity {
            // null lobe: perfect forward transmission
            if !query.lobes.test(self.null_lobe) {
                return None;
            }
            return Some(BsdfSample {
                wo: -*wi,
                dpd: SolidAngleSample::discrete(1.0 - opacity),
                eta: 1.0,
                lobe: LobeMask::lobe(self.null_lobe),
                weighted_bsdf: BsdfResult {
                    m: MuellerOperator::identity(),
                },
            });
        }

        self.nested.sample(wi, query, sampler)
    }

    fn pdf(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> SolidAngleDensity {
        let tquery = query.intersection.texture_query(query.k);
        self.opacity(&tquery) * self.nested.pdf(wi, wo, query)
    }

    /// No transmission on the masked nested BSDF.
    fn eta(&self, _wi: &Dir3, _wo: &Dir3, _k: Wavenumber) -> Float {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::tests::{arbitrary_k, surface};
    use crate::bsdf::{DielectricBsdf, DiffuseBsdf, Transport};
    use crate::math::Complex;
    use crate::sampler::UniformSampler;
    use crate::spectrum::ConstantComplexSpectrum;
    use crate::texture::ConstantTexture;
    use std::sync::Arc;

    fn diffuse(refl: Float) -> ArcBsdf {
        Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(refl))))
    }

    #[test]
    fn rejects_transmissive_nested() {
        let glass = Arc::new(DielectricBsdf::new(
            Arc::new(ConstantComplexSpectrum::new(Complex::from_real(1.0))),
            Arc::new(ConstantComplexSpectrum::new(Complex::from_real(1.5))),
            None,
            None,
        ));
        let r = MaskBsdf::new(Arc::new(ConstantTexture::new(0.5)), glass);
        assert!(matches!(r, Err(Error::MaskedTransmissive)));
    }

    #[test]
    fn adds_null_delta_lobe() {
        let b = MaskBsdf::new(Arc::new(ConstantTexture::new(0.5)), diffuse(0.5)).unwrap();
        let k = arbitrary_k();
        // diffuse has lobe 0; the null lobe lands on the highest free slot
        assert_eq!(b.lobes(k).count(), 2);
        assert!(b.is_delta_lobe(k, 31));
        assert!(!b.is_delta_lobe(k, 0));
    }

    #[test]
    fn opaque_mask_is_observationally_inner() {
        let inner = diffuse(0.6);
        let b = MaskBsdf::new(Arc::new(ConstantTexture::new(1.0)), inner.clone()).unwrap();
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.1, 0.0, 0.995).normalize();
        let wo = Dir3::new(-0.4, 0.2, 0.89).normalize();
        assert!(
            (b.f(&wi, &wo, &q).mean_intensity() - inner.f(&wi, &wo, &q).mean_intensity()).abs()
                < 1e-12
        );
        assert!((b.pdf(&wi, &wo, &q) - inner.pdf(&wi, &wo, &q)).abs() < 1e-12);
        let mut s = UniformSampler::new(6);
        for _ in 0..100 {
            let smp = b.sample(&wi, &q, &mut s).unwrap();
            // fully opaque: the null lobe is never selected
            assert!(!smp.lobe.test(31));
        }
    }

    #[test]
    fn null_lobe_selection_frequency() {
        let b = MaskBsdf::new(Arc::new(ConstantTexture::new(0.25)), diffuse(0.5)).unwrap();
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.0, 0.0, 1.0);
        let mut s = UniformSampler::new(12);
        let n = 20_000;
        let mut null = 0usize;
        for _ in 0..n {
            let smp = b.sample(&wi, &q, &mut s).unwrap();
            if smp.lobe.test(31) {
                // forward transmission straight through
                assert_eq!(smp.wo, -wi);
                null += 1;
            }
        }
        let frac = null as Float / n as Float;
        assert!((frac - 0.75).abs() < 0.02, "frac {frac}");
    }
}
