//! The integrator contract consumed by the render scheduler.

use crate::ads::Bvh8w;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::sensor::{BlockHandle, FilmStorage, Sensor};
use std::sync::Arc;

/// Renderer options visible to integrators.
#[derive(Copy, Clone, Default, Debug)]
pub struct IntegratorOpts {
    /// Forces plain ray tracing even when the sensor permits cone sweeps.
    pub force_ray_tracing: bool,
}

/// Everything an integrator needs to resolve radiance for a film element.
/// Shared and immutable for the lifetime of a render.
pub struct IntegratorContext {
    pub scene: Arc<Scene>,
    pub ads: Arc<Bvh8w>,
    pub sensor: Arc<Sensor>,
    pub film: Arc<FilmStorage>,
    pub opts: IntegratorOpts,
}

/// A light-transport algorithm. Invoked once per film element per block
/// job; must not block, and must confine its writes to the provided block.
pub trait Integrator: Send + Sync {
    /// Integrates `samples` samples for the film element at `position`
    /// (absolute film coordinates) and accumulates them into `block`.
    fn integrate(
        &self,
        ctx: &IntegratorContext,
        block: &mut BlockHandle,
        position: (u32, u32),
        samples: u32,
        sampler: &mut dyn Sampler,
    );
}

/// Atomic reference counted `Integrator`.
pub type ArcIntegrator = Arc<dyn Integrator>;
