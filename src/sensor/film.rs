//! Film storage: thread-safe accumulation and development.

use super::Tonemap;
use crate::bitmap::ColourEncoding;
use crate::interaction::StokesVector;
use crate::math::Float;
use std::sync::Mutex;

/// A developed (finite) scalar image of dimensionality `D`.
#[derive(Clone, Debug)]
pub struct DevelopedScalarFilm<const D: usize> {
    pub extent: [u32; D],
    pub data: Vec<Float>,
}

impl<const D: usize> DevelopedScalarFilm<D> {
    pub fn mean(&self) -> Float {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<Float>() / self.data.len() as Float
    }
}

impl DevelopedScalarFilm<2> {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Float {
        self.data[(y * self.extent[0] + x) as usize]
    }
}

/// A developed polarimetric (Stokes) image of dimensionality `D`.
#[derive(Clone, Debug)]
pub struct DevelopedPolarimetricFilm<const D: usize> {
    pub extent: [u32; D],
    pub data: Vec<StokesVector>,
}

impl DevelopedPolarimetricFilm<2> {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> StokesVector {
        self.data[(y * self.extent[0] + x) as usize]
    }
}

/// An axis-aligned film tile plus its accumulator. Acquired from the
/// sensor, handed to one worker at a time, written back into the film and
/// released (on drop) when the job completes.
pub struct BlockHandle {
    pub index: usize,
    pub position: (u32, u32),
    pub size: (u32, u32),
    channels: usize,
    accum: Vec<Float>,
    /// Samples per element accumulated into this block by the current job.
    pub spe: u32,
}

impl BlockHandle {
    pub(crate) fn new(index: usize, position: (u32, u32), size: (u32, u32), channels: usize) -> Self {
        Self {
            index,
            position,
            size,
            channels,
            accum: vec![0.0; size.0 as usize * size.1 as usize * channels],
            spe: 0,
        }
    }

    #[inline]
    fn offset(&self, pos_in_block: (u32, u32)) -> usize {
        debug_assert!(pos_in_block.0 < self.size.0 && pos_in_block.1 < self.size.1);
        (pos_in_block.1 as usize * self.size.0 as usize + pos_in_block.0 as usize) * self.channels
    }

    /// Accumulates a scalar radiance sample.
    #[inline]
    pub fn splat(&mut self, pos_in_block: (u32, u32), value: Float) {
        let o = self.offset(pos_in_block);
        self.accum[o] += value;
    }

    /// Accumulates a polarimetric radiance sample.
    #[inline]
    pub fn splat_stokes(&mut self, pos_in_block: (u32, u32), value: &StokesVector) {
        let o = self.offset(pos_in_block);
        for c in 0..self.channels.min(4) {
            self.accum[o + c] += value[c];
        }
    }
}

struct FilmData {
    accum: Vec<Float>,
    /// Samples per element written per block, used for fractional
    /// (partial) develops.
    block_spe: Vec<Float>,
}

/// Thread-safe accumulation buffer behind the blocks of one sensor.
/// Writers touch it only at `write_block` time; development requires the
/// scheduler to have quiesced the film.
pub struct FilmStorage {
    dim: (u32, u32),
    channels: usize,
    polarimetric: bool,
    tonemap: Option<Tonemap>,
    data: Mutex<FilmData>,
}

impl FilmStorage {
    pub fn new(
        dim: (u32, u32),
        polarimetric: bool,
        total_blocks: usize,
        tonemap: Option<Tonemap>,
    ) -> Self {
        let channels = if polarimetric { 4 } else { 1 };
        Self {
            dim,
            channels,
            polarimetric,
            tonemap,
            data: Mutex::new(FilmData {
                accum: vec![0.0; dim.0 as usize * dim.1 as usize * channels],
                block_spe: vec![0.0; total_blocks],
            }),
        }
    }

    #[inline]
    pub fn film_size(&self) -> (u32, u32) {
        self.dim
    }

    #[inline]
    pub fn dimensions_count(&self) -> usize {
        2
    }

    #[inline]
    pub fn is_polarimetric(&self) -> bool {
        self.polarimetric
    }

    #[inline]
    pub fn get_tonemap(&self) -> Option<&Tonemap> {
        self.tonemap.as_ref()
    }

    /// Colour encoding of the developed tonemapped film.
    pub fn colour_encoding_of_developed_tonemapped_film(&self) -> ColourEncoding {
        self.tonemap
            .as_ref()
            .map_or(ColourEncoding::Linear, |t| t.colour_encoding())
    }

    /// Mean samples-per-element across all blocks written so far.
    pub fn fractional_spe(&self) -> Float {
        let d = self.data.lock().unwrap();
        if d.block_spe.is_empty() {
            return 0.0;
        }
        d.block_spe.iter().sum::<Float>() / d.block_spe.len() as Float
    }

    /// Minimum and maximum per-block samples-per-element.
    pub fn block_spe_bounds(&self) -> (Float, Float) {
        let d = self.data.lock().unwrap();
        let mut lo = Float::INFINITY;
        let mut hi = Float::NEG_INFINITY;
        for &s in &d.block_spe {
            lo = lo.min(s);
            hi = hi.max(s);
        }
        (lo, hi)
    }

    /// Adds a completed block accumulator into the film. Serialised per
    /// film; a given block is in flight at most once.
    pub fn write_block(&self, block: &BlockHandle) {
        let mut d = self.data.lock().unwrap();
        let w = self.dim.0 as usize;
        for by in 0..block.size.1 as usize {
            let film_row =
                ((block.position.1 as usize + by) * w + block.position.0 as usize) * self.channels;
            let block_row = by * block.size.0 as usize * self.channels;
            let n = block.size.0 as usize * self.channels;
            for i in 0..n {
                d.accum[film_row + i] += block.accum[block_row + i];
            }
        }
        d.block_spe[block.index] += block.spe as Float;
    }

    fn develop_scalar(&self, spe: usize, tonemapped: bool) -> DevelopedScalarFilm<2> {
        let d = self.data.lock().unwrap();
        let n = self.dim.0 as usize * self.dim.1 as usize;
        let recp = if spe > 0 { 1.0 / spe as Float } else { 0.0 };
        let mut data = Vec::with_capacity(n);
        for i in 0..n {
            // scalar develop of a polarimetric film takes the intensity
            let mut v = d.accum[i * self.channels] * recp;
            if tonemapped {
                if let Some(t) = &self.tonemap {
                    v = t.apply(v);
                }
            }
            data.push(v);
        }
        DevelopedScalarFilm {
            extent: [self.dim.0, self.dim.1],
            data,
        }
    }

    fn develop_stokes(&self, spe: usize, tonemapped: bool) -> DevelopedPolarimetricFilm<2> {
        let d = self.data.lock().unwrap();
        let n = self.dim.0 as usize * self.dim.1 as usize;
        let recp = if spe > 0 { 1.0 / spe as Float } else { 0.0 };
        let mut data = Vec::with_capacity(n);
        for i in 0..n {
            let mut s = StokesVector::default();
            for c in 0..self.channels.min(4) {
                s[c] = d.accum[i * self.channels + c] * recp;
            }
            if tonemapped {
                if let Some(t) = &self.tonemap {
                    // tonemap the intensity, scaling the polarised part
                    let i0 = s.intensity();
                    let t0 = t.apply(i0);
                    let scale = if i0 > 0.0 { t0 / i0 } else { 0.0 };
                    s = s * scale;
                }
            }
            data.push(s);
        }
        DevelopedPolarimetricFilm {
            extent: [self.dim.0, self.dim.1],
            data,
        }
    }

    /// Develops the linear scalar film of a single-row (1-D) sensor.
    pub fn develop_lin_d1(&self, spe: usize) -> DevelopedScalarFilm<1> {
        debug_assert_eq!(self.dim.1, 1, "1-D develop of a 2-D film");
        let f = self.develop_scalar(spe, false);
        DevelopedScalarFilm {
            extent: [self.dim.0],
            data: f.data,
        }
    }

    /// Develops the tonemapped scalar film of a single-row (1-D) sensor.
    pub fn develop_d1(&self, spe: usize) -> DevelopedScalarFilm<1> {
        debug_assert_eq!(self.dim.1, 1, "1-D develop of a 2-D film");
        let f = self.develop_scalar(spe, true);
        DevelopedScalarFilm {
            extent: [self.dim.0],
            data: f.data,
        }
    }

    /// Develops the linear polarimetric film of a single-row sensor.
    pub fn develop_lin_stokes_d1(&self, spe: usize) -> DevelopedPolarimetricFilm<1> {
        debug_assert_eq!(self.dim.1, 1, "1-D develop of a 2-D film");
        let f = self.develop_stokes(spe, false);
        DevelopedPolarimetricFilm {
            extent: [self.dim.0],
            data: f.data,
        }
    }

    /// Develops the linear scalar film at the given spe count.
    pub fn develop_lin_d2(&self, spe: usize) -> DevelopedScalarFilm<2> {
        self.develop_scalar(spe, false)
    }

    /// Develops the tonemapped scalar film.
    pub fn develop_d2(&self, spe: usize) -> DevelopedScalarFilm<2> {
        self.develop_scalar(spe, true)
    }

    /// Develops the linear polarimetric film.
    pub fn develop_lin_stokes_d2(&self, spe: usize) -> DevelopedPolarimetricFilm<2> {
        self.develop_stokes(spe, false)
    }

    /// Develops the tonemapped polarimetric film.
    pub fn develop_stokes_d2(&self, spe: usize) -> DevelopedPolarimetricFilm<2> {
        self.develop_stokes(spe, true)
    }
}
