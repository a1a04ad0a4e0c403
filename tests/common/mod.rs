//! Shared scaffolding for the integration tests: mesh builders, a minimal
//! direct-illumination integrator and scene assembly.
#![allow(dead_code)]

use std::sync::{Arc, Once};
use wave_tracer::ads::{Bvh8w, Triangle};
use wave_tracer::bsdf::{ArcBsdf, BsdfQuery, Transport};
use wave_tracer::emitter::ArcEmitter;
use wave_tracer::integrator::{Integrator, IntegratorContext};
use wave_tracer::math::shapes::Aabb;
use wave_tracer::math::{Float, Range, Vec2, Vec3, Wavenumber, WavenumberRange};
use wave_tracer::sampler::Sampler;
use wave_tracer::scene::{Context, Scene};
use wave_tracer::sensor::{BlockHandle, Sensor, SensorView};
use wave_tracer::spectrum::UniformSpectrum;
use wave_tracer::util::ThreadPool;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn kr(a: Float, b: Float) -> WavenumberRange {
    Range::new(Wavenumber::from_inv_mm(a), Wavenumber::from_inv_mm(b))
}

/// An axis-aligned cube centred at `c` with half-extent `h`, 12 triangles.
pub fn cube_mesh(c: Vec3, h: Float, material: u32) -> Vec<Triangle> {
    let v = |x: Float, y: Float, z: Float| c + Vec3::new(x * h, y * h, z * h);
    let corners = [
        v(-1.0, -1.0, -1.0),
        v(1.0, -1.0, -1.0),
        v(-1.0, 1.0, -1.0),
        v(1.0, 1.0, -1.0),
        v(-1.0, -1.0, 1.0),
        v(1.0, -1.0, 1.0),
        v(-1.0, 1.0, 1.0),
        v(1.0, 1.0, 1.0),
    ];
    // two triangles per face
    const FACES: [[usize; 4]; 6] = [
        [0, 1, 3, 2], // -z
        [4, 6, 7, 5], // +z
        [0, 4, 5, 1], // -y
        [2, 3, 7, 6], // +y
        [0, 2, 6, 4], // -x
        [1, 5, 7, 3], // +x
    ];
    let mut tris = Vec::with_capacity(12);
    for f in FACES {
        tris.push(Triangle::new(corners[f[0]], corners[f[1]], corners[f[2]], material));
        tris.push(Triangle::new(corners[f[0]], corners[f[2]], corners[f[3]], material));
    }
    tris
}

/// A fan-triangulated disk in the plane `z = z0`.
pub fn disk_mesh(centre: Vec2, z0: Float, radius: Float, segments: usize, material: u32) -> Vec<Triangle> {
    let mut tris = Vec::with_capacity(segments);
    let c = Vec3::new(centre.x, centre.y, z0);
    for i in 0..segments {
        let a0 = i as Float / segments as Float * std::f64::consts::TAU as Float;
        let a1 = (i + 1) as Float / segments as Float * std::f64::consts::TAU as Float;
        // wind so the geometric normal faces -z (towards a camera below)
        tris.push(Triangle::new(
            c,
            c + Vec3::new(a1.cos() * radius, a1.sin() * radius, 0.0),
            c + Vec3::new(a0.cos() * radius, a0.sin() * radius, 0.0),
            material,
        ));
    }
    tris
}

/// A unit quad spanning `[-h, h]²` in the plane `z = z0`, facing -z.
pub fn quad_mesh(z0: Float, h: Float, material: u32) -> Vec<Triangle> {
    let v = [
        Vec3::new(-h, -h, z0),
        Vec3::new(h, -h, z0),
        Vec3::new(h, h, z0),
        Vec3::new(-h, h, z0),
    ];
    vec![
        Triangle::new(v[0], v[2], v[1], material),
        Triangle::new(v[0], v[3], v[2], material),
    ]
}

/// A random triangle soup for brute-force comparisons.
pub fn random_soup(n: usize, seed: u64, extent: Float) -> Vec<Triangle> {
    use wave_tracer::sampler::UniformSampler;
    let mut s = UniformSampler::new(seed);
    let rv = |s: &mut UniformSampler| {
        Vec3::new(
            (s.r() * 2.0 - 1.0) * extent,
            (s.r() * 2.0 - 1.0) * extent,
            (s.r() * 2.0 - 1.0) * extent,
        )
    };
    (0..n)
        .map(|_| {
            let a = rv(&mut s);
            let b = a + rv(&mut s) * 0.2;
            let c = a + rv(&mut s) * 0.2;
            Triangle::new(a, b, c, 0)
        })
        .collect()
}

/// An orthographic sensor looking along +z from below the scene.
pub fn ortho_sensor(
    id: &str,
    dim: (u32, u32),
    spe: u32,
    block_size: u32,
    extent: Float,
    krange: WavenumberRange,
) -> Arc<Sensor> {
    Arc::new(Sensor::new(
        id,
        dim,
        SensorView::Orthographic {
            origin: Vec3::new(0.0, 0.0, -10.0),
            dir: Vec3::new(0.0, 0.0, 1.0),
            extent: Vec2::new(extent, extent),
        },
        Arc::new(UniformSpectrum::new(1.0, krange).unwrap()),
        spe,
        block_size,
        None,
        false,
    ))
}

/// Direct illumination with one shadow connection per sample, weighted by
/// the sensor sensitivity over the sampled wavelength density.
pub struct DirectIntegrator;

impl Integrator for DirectIntegrator {
    fn integrate(
        &self,
        ctx: &IntegratorContext,
        block: &mut BlockHandle,
        position: (u32, u32),
        samples: u32,
        sampler: &mut dyn Sampler,
    ) {
        let sensor = ctx.sensor.as_ref();
        let film_dim = sensor.film_dimensions();
        let pos_in_block = (position.0 - block.position.0, position.1 - block.position.1);

        for _ in 0..samples {
            let Some(ews) = ctx.scene.sample_emitter_and_spectrum(sensor, sampler) else {
                block.splat(pos_in_block, 0.0);
                continue;
            };
            let k = ews.k;

            let ray = sensor
                .view()
                .generate_ray(position, film_dim, sampler.r2());

            let mut value = 0.0;
            if let Some(surface) = ctx
                .ads
                .intersect_ray(&ray, &Range::new(1e-6, Float::INFINITY))
            {
                let material = ctx.ads.triangle(surface.triangle).material;
                let bsdf: &ArcBsdf = ctx.scene.bsdf_for(material);

                let tq = surface.texture_query(k);
                let frame = bsdf.shading_frame(&tq, &surface.tangent_frame, &surface.ns);
                let wi = frame.to_local(&surface.wo);

                if let Some(es) =
                    ctx.scene
                        .sample_emitter_direct(sensor, sampler, &surface.p, k)
                {
                    let occluded = {
                        let sray =
                            wave_tracer::math::shapes::Ray::new(surface.p + es.dir * 1e-4, es.dir);
                        let tmax = if es.dist.is_finite() {
                            es.dist - 2e-4
                        } else {
                            1e8
                        };
                        ctx.ads.shadow_ray(&sray, &Range::new(0.0, tmax))
                    };
                    if !occluded {
                        let wo = frame.to_local(&es.dir);
                        let query = BsdfQuery::new(&surface, k, Transport::Backward);
                        let f = bsdf.f(&wi, &wo, &query).mean_intensity();
                        // spectral importance weight
                        let sens = sensor.sensitivity_spectrum().f(k);
                        let wpdf = ews.wavenumber_pdf.mm();
                        if wpdf > 0.0 {
                            value = f * es.beam.intensity() * sens / wpdf;
                        }
                    }
                }
            }
            block.splat(pos_in_block, value);
        }
    }
}

/// Assembles scene + ADS + renderer context.
pub fn make_scene(
    triangles: Vec<Triangle>,
    bsdfs: Vec<ArcBsdf>,
    emitters: Vec<ArcEmitter>,
    sensors: Vec<Arc<Sensor>>,
    threads: usize,
) -> (Arc<Scene>, Arc<Bvh8w>, Arc<Context>) {
    let ads = Arc::new(Bvh8w::build(triangles));
    let world = *ads.world_aabb();
    let world = if world.is_empty() {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    } else {
        world
    };
    let scene = Arc::new(Scene::new(
        "test-scene",
        Arc::new(DirectIntegrator),
        sensors,
        emitters,
        bsdfs,
        world,
    ));
    let ctx = Arc::new(Context::new(Arc::new(ThreadPool::new(threads))));
    (scene, ads, ctx)
}
