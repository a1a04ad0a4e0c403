//! Emitters.

use crate::interaction::StokesVector;
use crate::math::{Dir3, Float, SolidAngleDensity, Vec3, Wavenumber, WavenumberRange};
use crate::sampler::{Measure, Sampler};
use crate::spectrum::ArcSpectrumReal;
use std::sync::Arc;

/// A sampled direct connection from a world point to an emitter.
#[derive(Clone, Debug)]
pub struct EmitterDirectSample {
    /// Direction from the query point towards the emitter.
    pub dir: Dir3,
    /// Distance to the emitter sample.
    pub dist: Float,
    /// Incident beam weight along `dir`. The emitter sampling mass is
    /// folded in by the scene; the wavelength density is not.
    pub beam: StokesVector,
    /// Density of the positional sample on the emitter.
    pub density: Float,
    /// Measure of the positional sample.
    pub measure: Measure,
    /// Probability mass of having picked this emitter; filled by the
    /// scene's sampling machinery.
    pub emitter_pdf: Float,
}

/// A light source. Emission is characterised by a real power spectrum;
/// directional behaviour by the direct-sampling interface.
pub trait Emitter: Send + Sync {
    fn id(&self) -> &str;

    /// The emitter's power spectrum.
    fn power_spectrum(&self) -> &ArcSpectrumReal;

    /// Total emitted power restricted to a wavenumber range; the default
    /// integrates the power spectrum.
    fn spectral_power(&self, range: &WavenumberRange) -> Float {
        self.power_spectrum().power_over(range)
    }

    /// Samples a direct connection from world position `wp` at wavenumber
    /// `k`.
    fn sample_direct(
        &self,
        sampler: &mut dyn Sampler,
        wp: &Vec3,
        k: Wavenumber,
    ) -> EmitterDirectSample;

    /// Solid-angle density of a direct sample towards `dir` from `wp`.
    /// Delta emitters have no density.
    fn pdf_direct(&self, wp: &Vec3, dir: &Dir3) -> SolidAngleDensity;
}

/// Atomic reference counted `Emitter`.
pub type ArcEmitter = Arc<dyn Emitter>;

/// An isotropic point source positioned in the scene. Radiant intensity
/// is the spectrum value over the full sphere.
pub struct PointEmitter {
    id: String,
    position: Vec3,
    intensity: ArcSpectrumReal,
}

impl PointEmitter {
    pub fn new(id: impl Into<String>, position: Vec3, intensity: ArcSpectrumReal) -> Self {
        Self {
            id: id.into(),
            position,
            intensity,
        }
    }

    #[inline]
    pub fn position(&self) -> &Vec3 {
        &self.position
    }
}

impl Emitter for PointEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn power_spectrum(&self) -> &ArcSpectrumReal {
        &self.intensity
    }

    fn sample_direct(
        &self,
        _sampler: &mut dyn Sampler,
        wp: &Vec3,
        k: Wavenumber,
    ) -> EmitterDirectSample {
        let to = self.position - *wp;
        let dist = to.length();
        let dir = to / dist;
        // inverse-square falloff of the radiant intensity
        let w = self.intensity.f(k) / (dist * dist).max(1e-20);
        EmitterDirectSample {
            dir,
            dist,
            beam: StokesVector::unpolarised(w),
            density: 1.0,
            measure: Measure::Discrete,
            emitter_pdf: 1.0,
        }
    }

    fn pdf_direct(&self, _wp: &Vec3, _dir: &Dir3) -> SolidAngleDensity {
        // positional delta: no solid-angle density
        0.0
    }
}

/// A directional source: constant irradiance arriving from a fixed
/// direction, as if from infinity.
pub struct DirectionalEmitter {
    id: String,
    /// Direction of light propagation (towards the scene).
    direction: Dir3,
    irradiance: ArcSpectrumReal,
}

impl DirectionalEmitter {
    pub fn new(id: impl Into<String>, direction: Dir3, irradiance: ArcSpectrumReal) -> Self {
        Self {
            id: id.into(),
            direction: direction.normalize(),
            irradiance,
        }
    }
}

impl Emitter for DirectionalEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn power_spectrum(&self) -> &ArcSpectrumReal {
        &self.irradiance
    }

    fn sample_direct(
        &self,
        _sampler: &mut dyn Sampler,
        _wp: &Vec3,
        k: Wavenumber,
    ) -> EmitterDirectSample {
        EmitterDirectSample {
            dir: -self.direction,
            dist: Float::INFINITY,
            beam: StokesVector::unpolarised(self.irradiance.f(k)),
            density: 1.0,
            measure: Measure::Discrete,
            emitter_pdf: 1.0,
        }
    }

    fn pdf_direct(&self, _wp: &Vec3, _dir: &Dir3) -> SolidAngleDensity {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Range;
    use crate::sampler::UniformSampler;
    use crate::spectrum::UniformSpectrum;

    fn spectrum() -> ArcSpectrumReal {
        Arc::new(
            UniformSpectrum::new(
                2.0,
                Range::new(Wavenumber::from_inv_mm(0.0), Wavenumber::from_inv_mm(10.0)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn point_inverse_square() {
        let e = PointEmitter::new("p", Vec3::new(0.0, 0.0, 2.0), spectrum());
        let mut s = UniformSampler::new(0);
        let smp = e.sample_direct(&mut s, &Vec3::zero(), Wavenumber::from_inv_mm(5.0));
        assert!((smp.dist - 2.0).abs() < 1e-12);
        assert!((smp.beam.intensity() - 2.0 / 4.0).abs() < 1e-12);
        assert!((smp.dir - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn directional_constant() {
        let e = DirectionalEmitter::new("sun", Vec3::new(0.0, 0.0, -1.0), spectrum());
        let mut s = UniformSampler::new(0);
        let smp = e.sample_direct(&mut s, &Vec3::new(5.0, 1.0, 0.0), Wavenumber::from_inv_mm(5.0));
        assert_eq!(smp.beam.intensity(), 2.0);
        assert!((smp.dir - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert_eq!(smp.dist, Float::INFINITY);
    }
}
