//! Per-sensor emitter sampling machinery.

use crate::emitter::ArcEmitter;
use crate::math::distribution::{product_distribution, Distribution1D, IndexedDiscreteDistribution};
use crate::math::{Float, Wavenumber, WavenumberDensity};
use crate::sampler::Sampler;
use crate::scene::EmitterWavenumberSample;
use crate::sensor::Sensor;
use std::sync::Arc;

/// A wrapper around a sensor providing emitter sampling for it.
///
/// For each (sensor, emitter) pair, an integrated spectrum — the product of
/// the emitter's power spectrum and the sensor's sensitivity spectrum — is
/// precomputed as a distribution. Emitters are importance-sampled by the
/// spectral power those integrated spectra carry.
pub struct SceneSensor {
    sensor: Arc<Sensor>,

    /// Product distributions of emitter power times sensor sensitivity;
    /// absent when either side provides no distribution.
    emitter_sensor_spectra: Vec<Option<Distribution1D>>,
    /// Distribution of the powers contained in the integrated spectra.
    emitters_power_distribution: IndexedDiscreteDistribution,
}

impl SceneSensor {
    pub fn new(sensor: Arc<Sensor>, emitters: &[ArcEmitter]) -> Self {
        let sensitivity = sensor.sensitivity_spectrum();
        let sens_dist = sensitivity.distribution();

        let mut spectra = Vec::with_capacity(emitters.len());
        let mut weights = Vec::with_capacity(emitters.len());

        for e in emitters {
            let power_spectrum = e.power_spectrum();
            match (power_spectrum.distribution(), sens_dist) {
                (Some(ed), Some(sd)) => {
                    let p = product_distribution(ed, sd);
                    // integrated spectral power seen by the sensor:
                    // emitter power scaled by the spectra's correlation
                    weights.push(power_spectrum.power() * p.r0);
                    spectra.push(Some(p.dist));
                }
                _ => {
                    // fall back to the raw overlap power
                    log::warn!(
                        "emitter <{}> or sensor <{}> provides no spectral distribution; \
                         sampling falls back to the sensitivity range overlap",
                        e.id(),
                        sensor.id()
                    );
                    weights.push(power_spectrum.power_over(&sensor.wavenumber_range()));
                    spectra.push(None);
                }
            }
        }

        Self {
            sensor,
            emitter_sensor_spectra: spectra,
            emitters_power_distribution: IndexedDiscreteDistribution::new(&weights),
        }
    }

    #[inline]
    pub fn get_sensor(&self) -> &Arc<Sensor> {
        &self.sensor
    }

    /// Samples an emitter w.r.t. the integrated spectra.
    pub fn sample_emitter(&self, sampler: &mut dyn Sampler) -> Option<usize> {
        if self.emitter_sensor_spectra.is_empty() {
            return None;
        }
        Some(self.emitters_power_distribution.sample(sampler))
    }

    /// Probability mass of sampling an emitter for this sensor.
    #[inline]
    pub fn pdf_emitter(&self, emitter: usize) -> Float {
        self.emitters_power_distribution.pdf(emitter)
    }

    /// Samples an emitter and a wavenumber from its integrated spectrum.
    pub fn sample_emitter_and_spectrum(
        &self,
        sampler: &mut dyn Sampler,
    ) -> Option<EmitterWavenumberSample> {
        let emitter = self.sample_emitter(sampler)?;
        let spectrum = self.emitter_sensor_spectra[emitter].as_ref()?;

        let smp = spectrum.sample(sampler);
        Some(EmitterWavenumberSample {
            emitter,
            emitter_pdf: self.pdf_emitter(emitter),
            k: Wavenumber::from_inv_mm(smp.x),
            wavenumber_pdf: WavenumberDensity::from_mm(smp.pdf),
        })
    }

    /// Density of a wavenumber sample for a given emitter.
    pub fn pdf_wavenumber(&self, emitter: usize, k: Wavenumber) -> WavenumberDensity {
        match self.emitter_sensor_spectra.get(emitter) {
            Some(Some(spectrum)) => WavenumberDensity::from_mm(
                spectrum.pdf(k.inv_mm(), crate::sampler::Measure::Continuous),
            ),
            _ => WavenumberDensity::ZERO,
        }
    }
}
