//! Smooth dielectric BSDF.

use super::{Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask, SolidAngleSample, Transport};
use crate::interaction::{fresnel, refract, MuellerOperator};
use crate::math::{sqr, Complex, Dir3, Float, SolidAngleDensity, Vec3, Wavenumber};
use crate::sampler::Sampler;
use crate::spectrum::{ArcSpectrum, ArcSpectrumReal};

/// Smooth dielectric interface: a single delta lobe covering Fresnel
/// reflection and refraction.
pub struct DielectricBsdf {
    ext_ior: ArcSpectrum,
    ior: ArcSpectrum,

    reflection_scale: Option<ArcSpectrumReal>,
    transmission_scale: Option<ArcSpectrumReal>,
}

impl DielectricBsdf {
    pub fn new(
        ext_ior: ArcSpectrum,
        ior: ArcSpectrum,
        reflection_scale: Option<ArcSpectrumReal>,
        transmission_scale: Option<ArcSpectrumReal>,
    ) -> Self {
        Self {
            ext_ior,
            ior,
            reflection_scale,
            transmission_scale,
        }
    }

    /// Relative IOR `η_ext / η_int` at wavenumber `k`.
    #[inline]
    pub fn ior_ratio(&self, k: Wavenumber) -> Complex {
        let eta_1 = self.ext_ior.value(k);
        let eta_2 = self.ior.value(k);
        eta_1 / eta_2
    }

    #[inline]
    fn reflectivity_scale(&self, k: Wavenumber) -> Float {
        self.reflection_scale.as_ref().map_or(1.0, |s| s.f(k))
    }

    #[inline]
    fn transmissivity_scale(&self, k: Wavenumber) -> Float {
        self.transmission_scale.as_ref().map_or(1.0, |s| s.f(k))
    }
}

impl Bsdf for DielectricBsdf {
    fn albedo(&self, k: Wavenumber) -> Option<Float> {
        let f = fresnel(self.ior_ratio(k), &Vec3::new(0.0, 0.0, 1.0));
        Some((f.rs.norm_sqr() + f.rp.norm_sqr()) / 2.0 * self.reflectivity_scale(k))
    }

    fn lobes(&self, _k: Wavenumber) -> LobeMask {
        LobeMask::lobe(0)
    }

    fn is_delta_only(&self, _k: Wavenumber) -> bool {
        true
    }

    fn is_delta_lobe(&self, _k: Wavenumber, _lobe: u32) -> bool {
        true
    }

    /// Delta lobes are never evaluated by `f`.
    fn f(&self, _wi: &Dir3, _wo: &Dir3, _query: &BsdfQuery) -> BsdfResult {
        BsdfResult::zero()
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        if !query.lobes.test(0) || wi.z == 0.0 {
            return None;
        }

        // relative IOR along the direction of propagation
        let eta_c = self.ior_ratio(query.k);
        let eta = if wi.z >= 0.0 {
            eta_c.re
        } else {
            1.0 / eta_c.re
        };
        let eta_dir = if wi.z >= 0.0 {
            eta_c
        } else {
            Complex::ONE / eta_c
        };

        let fr = fresnel(eta_dir, wi);
        let r = ((fr.rs.norm_sqr() + fr.rp.norm_sqr()) / 2.0).clamp(0.0, 1.0);

        if sampler.r() < r {
            // specular reflection
            let wo = Dir3::new(-wi.x, -wi.y, wi.z);
            let m = MuellerOperator::fresnel(fr.rs, fr.rp)
                * (self.reflectivity_scale(query.k) / r);
            Some(BsdfSample {
                wo,
                dpd: SolidAngleSample::discrete(r),
                eta: 1.0,
                lobe: LobeMask::lobe(0),
                weighted_bsdf: BsdfResult { m },
            })
        } else {
            // refraction
            let wo = refract(wi, eta)?;
            let t = 1.0 - r;

            // rebuild the amplitude-derived operator so its throughput is
            // the power transmittance T = 1 - R
            let mt = MuellerOperator::fresnel(fr.ts, fr.tp);
            let a = mt.mean_intensity();
            let mut scale = if a > 0.0 { t / a } else { 0.0 };

            // radiance transport compresses by 1/η² through the interface
            if query.transport == Transport::Backward {
                scale *= sqr(eta);
            }

            let m = mt * (scale * self.transmissivity_scale(query.k) / t);
            Some(BsdfSample {
                wo,
                dpd: SolidAngleSample::discrete(t),
                eta: 1.0 / eta,
                lobe: LobeMask::lobe(0),
                weighted_bsdf: BsdfResult { m },
            })
        }
    }

    /// Delta lobes have no density at off-axis directions.
    fn pdf(&self, _wi: &Dir3, _wo: &Dir3, _query: &BsdfQuery) -> SolidAngleDensity {
        0.0
    }

    fn eta(&self, wi: &Dir3, _wo: &Dir3, k: Wavenumber) -> Float {
        let eta_1 = self.ext_ior.value(k).re;
        let eta_2 = self.ior.value(k).re;
        if wi.z >= 0.0 {
            eta_1 / eta_2
        } else {
            eta_2 / eta_1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::tests::{arbitrary_k, surface};
    use crate::sampler::UniformSampler;
    use crate::spectrum::ConstantComplexSpectrum;
    use std::sync::Arc;

    fn glass() -> DielectricBsdf {
        DielectricBsdf::new(
            Arc::new(ConstantComplexSpectrum::new(Complex::from_real(1.0))),
            Arc::new(ConstantComplexSpectrum::new(Complex::from_real(1.5))),
            None,
            None,
        )
    }

    #[test]
    fn eta_reciprocal_across_interface() {
        let b = glass();
        let k = arbitrary_k();
        let up = Dir3::new(0.0, 0.0, 1.0);
        let dn = Dir3::new(0.0, 0.0, -1.0);
        let e1 = b.eta(&up, &dn, k);
        let e2 = b.eta(&dn, &up, k);
        assert!((e1 * e2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn delta_classification() {
        let b = glass();
        let k = arbitrary_k();
        assert!(b.is_delta_only(k));
        assert!(b.is_delta_lobe(k, 0));
        let isect = surface();
        let q = BsdfQuery::new(&isect, k, Transport::Backward);
        let up = Dir3::new(0.0, 0.0, 1.0);
        assert_eq!(b.f(&up, &up, &q).mean_intensity(), 0.0);
        assert_eq!(b.pdf(&up, &up, &q), 0.0);
    }

    #[test]
    fn sample_reflect_or_refract() {
        let b = glass();
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Forward);
        let wi = Dir3::new(0.4, 0.0, (1.0f64 - 0.16).sqrt() as crate::math::Float);
        let mut s = UniformSampler::new(19);

        let mut reflections = 0;
        let mut refractions = 0;
        for _ in 0..2000 {
            let smp = b.sample(&wi, &q, &mut s).unwrap();
            if smp.wo.z > 0.0 {
                reflections += 1;
                // mirror direction
                assert!((smp.wo.x + wi.x).abs() < 1e-9);
                // energy-conserving reflection weight
                assert!((smp.weighted_bsdf.mean_intensity() - 1.0).abs() < 1e-6);
            } else {
                refractions += 1;
                assert!((smp.eta - 1.5).abs() < 1e-6);
            }
        }
        // glass at moderate incidence: mostly transmission
        assert!(refractions > reflections);
        assert!(reflections > 0);
    }

    #[test]
    fn energy_split_matches_fresnel() {
        let b = glass();
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Forward);
        let wi = Dir3::new(0.0, 0.0, 1.0);
        let mut s = UniformSampler::new(4);
        let n = 50_000;
        let mut refl = 0usize;
        for _ in 0..n {
            if b.sample(&wi, &q, &mut s).unwrap().wo.z > 0.0 {
                refl += 1;
            }
        }
        // R(0°) = 0.04 for glass
        let frac = refl as Float / n as Float;
        assert!((frac - 0.04).abs() < 0.005, "frac {frac}");
    }
}
