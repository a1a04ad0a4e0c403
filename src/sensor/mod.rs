//! Sensors: film storage, blocks, develop and tonemapping.

mod film;
mod tonemap;

pub use film::*;
pub use tonemap::*;

use crate::math::shapes::Ray;
use crate::math::{Dir3, Float, Frame, Vec2, Vec3, WavenumberRange};
use crate::spectrum::ArcSpectrumReal;
use std::sync::Arc;

/// The sensor's view into the scene: maps film positions to query rays.
#[derive(Clone, Debug)]
pub enum SensorView {
    /// Parallel projection covering `extent` world units around `origin`,
    /// looking along `dir`.
    Orthographic {
        origin: Vec3,
        dir: Dir3,
        extent: Vec2,
    },
    /// Pinhole projection with a vertical field of view in radians.
    Perspective {
        origin: Vec3,
        dir: Dir3,
        fov_y: Float,
    },
}

impl SensorView {
    /// Generates the query ray for a film position; `u` jitters within the
    /// pixel.
    pub fn generate_ray(&self, pixel: (u32, u32), film: (u32, u32), u: Vec2) -> Ray {
        let sx = (pixel.0 as Float + u.x) / film.0 as Float;
        let sy = (pixel.1 as Float + u.y) / film.1 as Float;

        match self {
            Self::Orthographic {
                origin,
                dir,
                extent,
            } => {
                let f = Frame::from_normal(dir);
                let ox = (sx - 0.5) * extent.x;
                let oy = (sy - 0.5) * extent.y;
                Ray::new(*origin + f.t * ox + f.b * oy, *dir)
            }
            Self::Perspective { origin, dir, fov_y } => {
                let f = Frame::from_normal(dir);
                let aspect = film.0 as Float / film.1 as Float;
                let tan_half = (fov_y * 0.5).tan();
                let dx = (sx * 2.0 - 1.0) * tan_half * aspect;
                let dy = (sy * 2.0 - 1.0) * tan_half;
                Ray::new(*origin, (f.t * dx + f.b * dy + f.n).normalize())
            }
        }
    }
}

/// A sensor: a film, a sensitivity spectrum, a block partition and a
/// requested sample budget.
pub struct Sensor {
    id: String,
    film_dim: (u32, u32),
    view: SensorView,
    sensitivity: ArcSpectrumReal,
    requested_spe: u32,
    block_size: u32,
    tonemap: Option<Tonemap>,
    polarimetric: bool,
    ray_trace_only: bool,
}

impl Sensor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        film_dim: (u32, u32),
        view: SensorView,
        sensitivity: ArcSpectrumReal,
        requested_spe: u32,
        block_size: u32,
        tonemap: Option<Tonemap>,
        polarimetric: bool,
    ) -> Self {
        debug_assert!(film_dim.0 > 0 && film_dim.1 > 0 && block_size > 0);
        Self {
            id: id.into(),
            film_dim,
            view,
            sensitivity,
            requested_spe,
            block_size,
            tonemap,
            polarimetric,
            ray_trace_only: false,
        }
    }

    /// Restricts the sensor to plain ray tracing (no cone sweeps).
    pub fn with_ray_trace_only(mut self, v: bool) -> Self {
        self.ray_trace_only = v;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn film_dimensions(&self) -> (u32, u32) {
        self.film_dim
    }

    #[inline]
    pub fn view(&self) -> &SensorView {
        &self.view
    }

    /// The sensor's spectral sensitivity.
    #[inline]
    pub fn sensitivity_spectrum(&self) -> &ArcSpectrumReal {
        &self.sensitivity
    }

    /// The wavenumber range the sensor responds to.
    #[inline]
    pub fn wavenumber_range(&self) -> WavenumberRange {
        self.sensitivity.wavenumber_range()
    }

    /// Requested samples per film element.
    #[inline]
    pub fn requested_samples_per_element(&self) -> u32 {
        self.requested_spe
    }

    #[inline]
    pub fn is_polarimetric(&self) -> bool {
        self.polarimetric
    }

    #[inline]
    pub fn ray_trace_only(&self) -> bool {
        self.ray_trace_only
    }

    #[inline]
    pub fn get_tonemap(&self) -> Option<&Tonemap> {
        self.tonemap.as_ref()
    }

    /// Block grid dimensions of the film partition.
    pub fn block_grid(&self) -> (u32, u32) {
        (
            self.film_dim.0.div_ceil(self.block_size),
            self.film_dim.1.div_ceil(self.block_size),
        )
    }

    /// The total block set tiles the film.
    pub fn total_sensor_blocks(&self) -> usize {
        let (bx, by) = self.block_grid();
        bx as usize * by as usize
    }

    /// Position and size of block `index`.
    pub fn block_rect(&self, index: usize) -> ((u32, u32), (u32, u32)) {
        let (bx, _) = self.block_grid();
        let gx = index as u32 % bx;
        let gy = index as u32 / bx;
        let pos = (gx * self.block_size, gy * self.block_size);
        let size = (
            self.block_size.min(self.film_dim.0 - pos.0),
            self.block_size.min(self.film_dim.1 - pos.1),
        );
        (pos, size)
    }

    /// Creates the accumulation film for this sensor.
    pub fn create_sensor_film(&self) -> Arc<FilmStorage> {
        Arc::new(FilmStorage::new(
            self.film_dim,
            self.polarimetric,
            self.total_sensor_blocks(),
            self.tonemap.clone(),
        ))
    }

    /// Acquires a zeroed block accumulator for block `index`.
    pub fn acquire_sensor_block(&self, _film: &FilmStorage, index: usize) -> BlockHandle {
        let (pos, size) = self.block_rect(index);
        BlockHandle::new(index, pos, size, if self.polarimetric { 4 } else { 1 })
    }

    /// Releases a block back to the film. Blocks release on drop; the
    /// explicit form exists for the scheduler's bookkeeping.
    pub fn release_sensor_block(&self, _film: &FilmStorage, block: BlockHandle) {
        drop(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Range, Wavenumber};
    use crate::spectrum::UniformSpectrum;

    pub(crate) fn test_sensor(dim: (u32, u32), block: u32, spe: u32) -> Sensor {
        let sens = Arc::new(
            UniformSpectrum::new(
                1.0,
                Range::new(Wavenumber::from_inv_mm(1.0), Wavenumber::from_inv_mm(100.0)),
            )
            .unwrap(),
        );
        Sensor::new(
            "test",
            dim,
            SensorView::Orthographic {
                origin: Vec3::zero(),
                dir: Vec3::new(0.0, 0.0, 1.0),
                extent: Vec2::new(2.0, 2.0),
            },
            sens,
            spe,
            block,
            None,
            false,
        )
    }

    #[test]
    fn blocks_tile_film() {
        let s = test_sensor((70, 33), 32, 16);
        assert_eq!(s.block_grid(), (3, 2));
        assert_eq!(s.total_sensor_blocks(), 6);

        // the union of the blocks covers every pixel exactly once
        let mut covered = vec![0u32; 70 * 33];
        for b in 0..s.total_sensor_blocks() {
            let (pos, size) = s.block_rect(b);
            for y in pos.1..pos.1 + size.1 {
                for x in pos.0..pos.0 + size.0 {
                    covered[(y * 70 + x) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn ortho_rays_parallel() {
        let s = test_sensor((8, 8), 8, 1);
        let r0 = s.view().generate_ray((0, 0), (8, 8), Vec2::new(0.5, 0.5));
        let r1 = s.view().generate_ray((7, 7), (8, 8), Vec2::new(0.5, 0.5));
        assert!((r0.d - r1.d).length() < 1e-12);
        assert!((r0.o - r1.o).length() > 0.1);
    }
}
