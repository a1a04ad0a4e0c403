//! Scenes: immutable scene data plus emitter and spectral sampling.

mod interrupts;
mod render_results;
mod renderer;
mod scene_sensor;

pub use interrupts::*;
pub use render_results::*;
pub use renderer::*;
pub use scene_sensor::*;

use crate::bsdf::ArcBsdf;
use crate::emitter::{ArcEmitter, EmitterDirectSample};
use crate::integrator::ArcIntegrator;
use crate::math::shapes::Aabb;
use crate::math::{Float, Vec3, Wavenumber, WavenumberDensity};
use crate::sampler::Sampler;
use crate::sensor::Sensor;
use std::sync::Arc;

/// A sampled (emitter, wavenumber) pair for a sensor.
#[derive(Copy, Clone, Debug)]
pub struct EmitterWavenumberSample {
    pub emitter: usize,
    pub emitter_pdf: Float,
    pub k: Wavenumber,
    pub wavenumber_pdf: WavenumberDensity,
}

/// Holds all scene data and provides emitter and spectral sampling
/// facilities. Immutable after construction; shared between the scheduler
/// and all workers.
pub struct Scene {
    id: String,

    integrator: ArcIntegrator,
    emitters: Vec<ArcEmitter>,
    /// Material table; triangles refer into this by index.
    bsdfs: Vec<ArcBsdf>,
    sensors: Vec<SceneSensor>,

    world_aabb: Aabb,
}

impl Scene {
    pub fn new(
        id: impl Into<String>,
        integrator: ArcIntegrator,
        sensors: Vec<Arc<Sensor>>,
        emitters: Vec<ArcEmitter>,
        bsdfs: Vec<ArcBsdf>,
        world_aabb: Aabb,
    ) -> Self {
        let scene_sensors = sensors
            .into_iter()
            .map(|s| SceneSensor::new(s, &emitters))
            .collect();

        Self {
            id: id.into(),
            integrator,
            emitters,
            bsdfs,
            sensors: scene_sensors,
            world_aabb,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn integrator(&self) -> &ArcIntegrator {
        &self.integrator
    }

    #[inline]
    pub fn sensors(&self) -> &[SceneSensor] {
        &self.sensors
    }

    #[inline]
    pub fn emitters(&self) -> &[ArcEmitter] {
        &self.emitters
    }

    #[inline]
    pub fn emitter(&self, idx: usize) -> &ArcEmitter {
        &self.emitters[idx]
    }

    #[inline]
    pub fn bsdfs(&self) -> &[ArcBsdf] {
        &self.bsdfs
    }

    /// BSDF for a triangle's material index.
    #[inline]
    pub fn bsdf_for(&self, material: u32) -> &ArcBsdf {
        &self.bsdfs[material as usize]
    }

    #[inline]
    pub fn world_aabb(&self) -> &Aabb {
        &self.world_aabb
    }

    fn scene_sensor(&self, sensor: &Sensor) -> Option<&SceneSensor> {
        self.sensors
            .iter()
            .find(|s| std::ptr::eq(s.get_sensor().as_ref(), sensor))
    }

    /// Samples an emitter and a wavenumber from the sampled emitter's
    /// spectrum integrated over the sensor's sensitivity.
    pub fn sample_emitter_and_spectrum(
        &self,
        sensor: &Sensor,
        sampler: &mut dyn Sampler,
    ) -> Option<EmitterWavenumberSample> {
        self.scene_sensor(sensor)?.sample_emitter_and_spectrum(sampler)
    }

    /// Samples a direct connection from a world position to a scene
    /// emitter for a given sensor. The emitter's sampling mass is divided
    /// into the beam; the wavelength density is not.
    pub fn sample_emitter_direct(
        &self,
        sensor: &Sensor,
        sampler: &mut dyn Sampler,
        wp: &Vec3,
        k: Wavenumber,
    ) -> Option<EmitterDirectSample> {
        let scs = self.scene_sensor(sensor)?;
        let emitter_idx = scs.sample_emitter(sampler)?;
        let pd = scs.pdf_emitter(emitter_idx);

        let mut sample = self.emitters[emitter_idx].sample_direct(sampler, wp, k);
        sample.emitter_pdf = pd;
        sample.beam = sample.beam * (1.0 / pd);
        Some(sample)
    }

    /// Probability mass of sampling an emitter for a sensor.
    pub fn pdf_emitter(&self, sensor: &Sensor, emitter: usize) -> Float {
        self.scene_sensor(sensor)
            .map_or(0.0, |s| s.pdf_emitter(emitter))
    }

    /// Probability density of a wavenumber sample, given an emitter and a
    /// sensor.
    pub fn pdf_spectral_sample(
        &self,
        sensor: &Sensor,
        emitter: usize,
        k: Wavenumber,
    ) -> WavenumberDensity {
        self.scene_sensor(sensor)
            .map_or(WavenumberDensity::ZERO, |s| s.pdf_wavenumber(emitter, k))
    }

    /// Joint density of an (emitter, wavenumber) pair.
    pub fn pdf_emitter_and_spectral_sample(
        &self,
        sensor: &Sensor,
        emitter: usize,
        k: Wavenumber,
    ) -> WavenumberDensity {
        self.pdf_spectral_sample(sensor, emitter, k) * self.pdf_emitter(sensor, emitter)
    }

    /// Spectral density for `k` summed over all scene emitters, for
    /// multiple importance sampling.
    pub fn sum_spectral_pdf_for_all_emitters(
        &self,
        sensor: &Sensor,
        k: Wavenumber,
    ) -> WavenumberDensity {
        let mut sum = WavenumberDensity::ZERO;
        for e in 0..self.emitters.len() {
            sum += self.pdf_spectral_sample(sensor, e, k) * self.pdf_emitter(sensor, e);
        }
        sum
    }
}
