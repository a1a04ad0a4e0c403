//! Rendering results.

use crate::bitmap::ColourEncoding;
use crate::math::Float;
use crate::sensor::{DevelopedPolarimetricFilm, DevelopedScalarFilm};
use rustc_hash::FxHashMap;
use std::time::Duration;

/// A linear film and, when the sensor carries a tonemap, its tonemapped
/// companion with the companion's colour encoding.
pub struct DevelopedScalarFilmPair<const D: usize> {
    /// Tonemapped developed film, when a tonemap is configured.
    pub developed_tonemapped: Option<DevelopedScalarFilm<D>>,
    /// Colour encoding of the tonemapped developed film.
    pub tonemapped_film_colour_encoding: ColourEncoding,
    /// Developed film without the tonemap operator; always linear.
    pub developed: DevelopedScalarFilm<D>,
}

/// Polarimetric counterpart of `DevelopedScalarFilmPair`.
pub struct DevelopedPolarimetricFilmPair<const D: usize> {
    pub developed_tonemapped: Option<DevelopedPolarimetricFilm<D>>,
    pub tonemapped_film_colour_encoding: ColourEncoding,
    pub developed: DevelopedPolarimetricFilm<D>,
}

/// The developed films of one sensor; the held variant depends on the
/// sensor response.
pub enum DevelopedFilms {
    Scalar1(DevelopedScalarFilmPair<1>),
    Scalar2(DevelopedScalarFilmPair<2>),
    Scalar3(DevelopedScalarFilmPair<3>),
    Polarimetric1(DevelopedPolarimetricFilmPair<1>),
    Polarimetric2(DevelopedPolarimetricFilmPair<2>),
    Polarimetric3(DevelopedPolarimetricFilmPair<3>),
}

impl DevelopedFilms {
    /// The 2-D scalar pair, when that is the held variant.
    pub fn as_scalar2(&self) -> Option<&DevelopedScalarFilmPair<2>> {
        match self {
            Self::Scalar2(p) => Some(p),
            _ => None,
        }
    }

    /// The 2-D polarimetric pair, when that is the held variant.
    pub fn as_polarimetric2(&self) -> Option<&DevelopedPolarimetricFilmPair<2>> {
        match self {
            Self::Polarimetric2(p) => Some(p),
            _ => None,
        }
    }
}

/// Rendering results for one sensor.
pub struct SensorRenderResult {
    pub sensor_id: String,
    pub render_elapsed_time: Duration,
    pub developed_films: DevelopedFilms,
    /// Samples per element recorded into the developed films.
    pub spe_written: usize,
    /// For partial results, the average spe over all written blocks.
    pub fractional_spe: Option<Float>,
}

/// A scene's rendering results, keyed by sensor id.
#[derive(Default)]
pub struct RenderResult {
    pub sensors: FxHashMap<String, SensorRenderResult>,
    pub render_elapsed_time: Duration,
}
