//! Normal-mapping BSDF adaptor.

use super::{ArcBsdf, Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask};
use crate::interaction::SurfaceDifferentials;
use crate::math::{Dir3, Float, Frame, SolidAngleDensity, Vec3, Wavenumber};
use crate::sampler::Sampler;
use crate::texture::{ArcTexture, TextureQuery};

/// Perturbs the shading frame with a tangent-space normal map and
/// delegates everything else. A texel of `[.5, .5, 1]` encodes an
/// unchanged normal; bitmap textures should use linear colour encoding.
pub struct NormalmapBsdf {
    normalmap: ArcTexture,
    nested: ArcBsdf,
    flip: bool,
}

impl NormalmapBsdf {
    pub fn new(normalmap: ArcTexture, nested: ArcBsdf, flip: bool) -> Self {
        Self {
            normalmap,
            nested,
            flip,
        }
    }

    #[inline]
    pub fn nested_bsdf(&self) -> &ArcBsdf {
        &self.nested
    }
}

impl Bsdf for NormalmapBsdf {
    fn shading_frame(
        &self,
        tquery: &TextureQuery,
        tangent_frame: &SurfaceDifferentials,
        ns: &Dir3,
    ) -> Frame {
        // decode the tangent-space normal
        let rgba = self.normalmap.rgba(tquery);
        let mut nmn = Vec3::new(rgba.x * 2.0 - 1.0, rgba.y * 2.0 - 1.0, rgba.z * 2.0 - 1.0);
        if self.flip {
            nmn.x = -nmn.x;
            nmn.y = -nmn.y;
        }
        let n = nmn.normalize();

        // perturb the world shading normal by the decoded normal
        let sworld = self.nested.shading_frame(tquery, tangent_frame, ns);
        self.nested
            .shading_frame(tquery, tangent_frame, &sworld.to_world(&n))
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
        self.nested.needs_interaction_footprint() || self.normalmap.needs_interaction_footprint()
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        self.nested.f(wi, wo, query)
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        self.nested.sample(wi, query, sampler)
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
    use crate::bsdf::tests::arbitrary_k;
    use crate::bsdf::DiffuseBsdf;
    use crate::texture::ConstantTexture;
    use std::sync::Arc;

    struct FixedRgb(Vec3);
    impl crate::texture::Texture for FixedRgb {
        fn rgba(&self, _q: &TextureQuery) -> crate::math::Vec4 {
            crate::math::Vec4::new(self.0.x, self.0.y, self.0.z, 1.0)
        }
        fn f(&self, _q: &TextureQuery) -> Float {
            0.0
        }
        fn mean_value(&self, _k: Wavenumber) -> Option<Float> {
            None
        }
        fn is_constant(&self) -> bool {
            true
        }
    }

    #[test]
    fn neutral_texel_keeps_normal() {
        let b = NormalmapBsdf::new(
            Arc::new(FixedRgb(Vec3::new(0.5, 0.5, 1.0))),
            Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(0.5)))),
            false,
        );
        let tq = TextureQuery {
            uv: crate::math::Vec2::new(0.5, 0.5),
            k: arbitrary_k(),
        };
        let ns = Vec3::new(0.0, 0.0, 1.0);
        let f = b.shading_frame(&tq, &SurfaceDifferentials::default(), &ns);
        assert!((f.n - ns).length() < 1e-6);
    }

    #[test]
    fn tilted_texel_perturbs_normal() {
        // encode a normal tilted towards +x
        let tilted = Vec3::new(0.5, 0.0, 1.0).normalize();
        let b = NormalmapBsdf::new(
            Arc::new(FixedRgb(Vec3::new(
                tilted.x * 0.5 + 0.5,
                tilted.y * 0.5 + 0.5,
                tilted.z * 0.5 + 0.5,
            ))),
            Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(0.5)))),
            false,
        );
        let tq = TextureQuery {
            uv: crate::math::Vec2::new(0.5, 0.5),
            k: arbitrary_k(),
        };
        let ns = Vec3::new(0.0, 0.0, 1.0);
        let f = b.shading_frame(&tq, &SurfaceDifferentials::default(), &ns);
        assert!(f.n.x > 0.3);
        assert!((f.n.length() - 1.0).abs() < 1e-6);
    }
}
