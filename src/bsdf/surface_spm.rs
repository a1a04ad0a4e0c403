//! First-order small-perturbation (SPM) surface BSDF.

use super::{Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask, SolidAngleSample};
use crate::interaction::{fresnel, MuellerOperator};
use crate::math::{sqr, Complex, Dir3, Float, SolidAngleDensity, Vec2, Vec3, Wavenumber, PI};
use crate::sampler::{cosine_hemisphere_pdf, square_to_cosine_hemisphere, Sampler};
use crate::spectrum::{ArcSpectrum, ArcSpectrumReal};
use std::sync::Arc;

/// A statistical rough-surface height profile, characterised by its power
/// spectral density.
pub trait SurfaceProfile: Send + Sync {
    /// TRUE when the profile scatters nothing diffusely at wavenumber `k`
    /// (the surface is optically smooth there).
    fn is_delta_only(&self, k: Wavenumber) -> bool;

    /// Power spectral density at in-plane spatial frequency `q` (1/mm).
    fn psd(&self, q: Float) -> Float;

    /// Fraction of reflected energy that stays in the specular lobe,
    /// `exp(-(2 k σ cosθ)²)`.
    fn specular_attenuation(&self, k: Wavenumber, cos_theta: Float) -> Float;
}

/// Gaussian-correlated random rough surface: rms height `sigma` and
/// correlation length `l`, both in mm.
pub struct GaussianSurfaceProfile {
    sigma: Float,
    corr_length: Float,
}

impl GaussianSurfaceProfile {
    pub fn new(sigma: Float, corr_length: Float) -> Self {
        Self { sigma, corr_length }
    }
}

impl SurfaceProfile for GaussianSurfaceProfile {
    fn is_delta_only(&self, _k: Wavenumber) -> bool {
        self.sigma == 0.0
    }

    fn psd(&self, q: Float) -> Float {
        // PSD of a Gaussian correlation function, normalised so that
        // ∫ PSD(q) d²q = σ²
        let l2 = sqr(self.corr_length);
        sqr(self.sigma) * l2 / (4.0 * PI) * (-sqr(q) * l2 / 4.0).exp()
    }

    fn specular_attenuation(&self, k: Wavenumber, cos_theta: Float) -> Float {
        (-sqr(2.0 * k.inv_mm() * self.sigma * cos_theta)).exp()
    }
}

pub type ArcSurfaceProfile = Arc<dyn SurfaceProfile>;

/// Generic smooth to moderately-rough surface with arbitrary (real or
/// complex) IOR and surface profile. Scattering is formalised via first
/// order SPM: a specular delta lobe plus a profile-driven scattered lobe.
pub struct SurfaceSpmBsdf {
    ext_ior: ArcSpectrum,
    ior: ArcSpectrum,
    profile: ArcSurfaceProfile,

    reflection_scale: Option<ArcSpectrumReal>,
}

impl SurfaceSpmBsdf {
    pub const LOBE_SPECULAR: u32 = 0;
    pub const LOBE_SCATTERED: u32 = 1;

    pub fn new(
        ext_ior: ArcSpectrum,
        ior: ArcSpectrum,
        profile: ArcSurfaceProfile,
        reflection_scale: Option<ArcSpectrumReal>,
    ) -> Self {
        Self {
            ext_ior,
            ior,
            profile,
            reflection_scale,
        }
    }

    #[inline]
    fn ior_ratio(&self, k: Wavenumber) -> Complex {
        self.ext_ior.value(k) / self.ior.value(k)
    }

    #[inline]
    fn reflectivity_scale(&self, k: Wavenumber) -> Float {
        self.reflection_scale.as_ref().map_or(1.0, |s| s.f(k))
    }

    // probability of selecting the scattered lobe for an incident cosine
    fn scattered_selection(&self, k: Wavenumber, cos_i: Float) -> Float {
        if self.profile.is_delta_only(k) {
            0.0
        } else {
            1.0 - self.profile.specular_attenuation(k, cos_i)
        }
    }

    // scattered-lobe radiometry: Fresnel-weighted, PSD-shaped, includes the
    // exitant cosine
    fn scattered_f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        let k = query.k;
        let sel = self.scattered_selection(k, wi.z);
        if sel <= 0.0 {
            return BsdfResult::zero();
        }

        let fr = fresnel(self.ior_ratio(k), wi);
        // in-plane wave-vector transfer; zero at the specular direction
        let q = Vec2::new(wo.x + wi.x, wo.y + wi.y) * k.inv_mm();
        let shape = self.profile.psd(q.length()) / self.profile.psd(0.0);

        let m = MuellerOperator::fresnel(fr.rs, fr.rp);
        let r = m.mean_intensity().max(1e-9);
        let scale =
            sel * self.reflectivity_scale(k) * shape * wo.z.max(0.0) / (PI * r);
        BsdfResult { m: m * scale }
    }
}

impl Bsdf for SurfaceSpmBsdf {
    fn albedo(&self, k: Wavenumber) -> Option<Float> {
        let f = fresnel(self.ior_ratio(k), &Vec3::new(0.0, 0.0, 1.0));
        Some((f.rs.norm_sqr() + f.rp.norm_sqr()) / 2.0 * self.reflectivity_scale(k))
    }

    fn lobes(&self, k: Wavenumber) -> LobeMask {
        let mut lobes = LobeMask::lobe(Self::LOBE_SPECULAR);
        if !self.profile.is_delta_only(k) {
            lobes.set(Self::LOBE_SCATTERED);
        }
        lobes
    }

    fn is_delta_only(&self, k: Wavenumber) -> bool {
        self.profile.is_delta_only(k)
    }

    fn is_delta_lobe(&self, _k: Wavenumber, lobe: u32) -> bool {
        lobe == Self::LOBE_SPECULAR
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        if wi.z <= 0.0 || wo.z <= 0.0 || !query.lobes.test(Self::LOBE_SCATTERED) {
            return BsdfResult::zero();
        }
        self.scattered_f(wi, wo, query)
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        if wi.z <= 0.0 {
            return None;
        }
        let k = query.k;
        let sel = if query.lobes.test(Self::LOBE_SCATTERED) {
            self.scattered_selection(k, wi.z)
        } else {
            0.0
        };

        if sampler.r() >= sel {
            // specular delta lobe
            if !query.lobes.test(Self::LOBE_SPECULAR) {
                return None;
            }
            let fr = fresnel(self.ior_ratio(k), wi);
            let spec = 1.0 - sel;
            let attenuation = self.profile.specular_attenuation(k, wi.z);
            let m = MuellerOperator::fresnel(fr.rs, fr.rp)
                * (self.reflectivity_scale(k) * attenuation / spec.max(1e-9));
            Some(BsdfSample {
                wo: Dir3::new(-wi.x, -wi.y, wi.z),
                dpd: SolidAngleSample::discrete(spec),
                eta: 1.0,
                lobe: LobeMask::lobe(Self::LOBE_SPECULAR),
                weighted_bsdf: BsdfResult { m },
            })
        } else {
            // scattered lobe, cosine-distributed
            let wo = square_to_cosine_hemisphere(sampler.r2());
            let pdf = sel * cosine_hemisphere_pdf(wo.z);
            if pdf <= 0.0 {
                return None;
            }
            let f = self.scattered_f(wi, &wo, query);
            Some(BsdfSample {
                wo,
                dpd: SolidAngleSample::continuous(pdf),
                eta: 1.0,
                lobe: LobeMask::lobe(Self::LOBE_SCATTERED),
                weighted_bsdf: BsdfResult {
                    m: f.m * (1.0 / pdf),
                },
            })
        }
    }

    fn pdf(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> SolidAngleDensity {
        if wi.z <= 0.0 || wo.z <= 0.0 {
            return 0.0;
        }
        self.scattered_selection(query.k, wi.z) * cosine_hemisphere_pdf(wo.z)
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
    use crate::bsdf::Transport;
    use crate::sampler::UniformSampler;
    use crate::spectrum::ConstantComplexSpectrum;

    fn spm(sigma: Float) -> SurfaceSpmBsdf {
        SurfaceSpmBsdf::new(
            Arc::new(ConstantComplexSpectrum::new(Complex::from_real(1.0))),
            Arc::new(ConstantComplexSpectrum::new(Complex::new(0.27, 2.9))),
            Arc::new(GaussianSurfaceProfile::new(sigma, 5e-4)),
            None,
        )
    }

    #[test]
    fn smooth_profile_is_specular_only() {
        let b = spm(0.0);
        let k = arbitrary_k();
        assert!(b.is_delta_only(k));
        assert_eq!(b.lobes(k).count(), 1);
        let isect = surface();
        let q = BsdfQuery::new(&isect, k, Transport::Backward);
        let wi = Dir3::new(0.0, 0.0, 1.0);
        let mut s = UniformSampler::new(1);
        let smp = b.sample(&wi, &q, &mut s).unwrap();
        assert_eq!(smp.wo, Dir3::new(0.0, 0.0, 1.0));
        assert!(smp.lobe.test(SurfaceSpmBsdf::LOBE_SPECULAR));
    }

    #[test]
    fn rough_profile_has_two_lobes() {
        // ~20nm rms roughness at visible wavelengths
        let b = spm(2e-5);
        let k = arbitrary_k();
        assert!(!b.is_delta_only(k));
        assert_eq!(b.lobes(k).count(), 2);
        assert!(b.is_delta_lobe(k, SurfaceSpmBsdf::LOBE_SPECULAR));
        assert!(!b.is_delta_lobe(k, SurfaceSpmBsdf::LOBE_SCATTERED));
    }

    #[test]
    fn scattered_pdf_matches_sample() {
        let b = spm(2e-5);
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.2, 0.1, 0.97).normalize();
        let mut s = UniformSampler::new(8);
        let mut seen_scattered = false;
        for _ in 0..500 {
            let smp = b.sample(&wi, &q, &mut s).unwrap();
            if smp.lobe.test(SurfaceSpmBsdf::LOBE_SCATTERED) {
                seen_scattered = true;
                let pdf = b.pdf(&wi, &smp.wo, &q);
                assert!((pdf - smp.dpd.density).abs() < 1e-9);
            }
        }
        assert!(seen_scattered);
    }

    #[test]
    fn scattered_peaks_near_specular() {
        let b = spm(2e-5);
        let isect = surface();
        let q = BsdfQuery::new(&isect, arbitrary_k(), Transport::Backward);
        let wi = Dir3::new(0.3, 0.0, (1.0f64 - 0.09).sqrt() as Float);
        let spec = Dir3::new(-0.3, 0.0, wi.z);
        let off = Dir3::new(0.7, 0.0, (1.0f64 - 0.49).sqrt() as Float);
        assert!(b.f(&wi, &spec, &q).mean_intensity() > b.f(&wi, &off, &q).mean_intensity());
    }
}
