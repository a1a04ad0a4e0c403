//! Errors surfaced during scene-element construction.
//!
//! Run-time query paths are infallible by construction; everything that can
//! go wrong is validated when the element is built and reported through
//! these variants.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A distribution could not be constructed from degenerate inputs,
    /// e.g. a binned piecewise-linear distribution whose bin size cannot
    /// be determined.
    #[error("degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// A spectrum was constructed from invalid data (empty range, negative
    /// power, unsorted samples).
    #[error("invalid spectrum: {0}")]
    InvalidSpectrum(String),

    /// `mask` BSDFs admit no transmissive nested BSDFs.
    #[error("mask bsdf: nested BSDF is transmissive")]
    MaskedTransmissive,

    /// `mask` BSDFs require a free lobe slot on the nested BSDF for the
    /// null transmission lobe.
    #[error("mask bsdf: nested BSDF admits no empty lobes")]
    NoFreeLobe,

    /// Composite spectra and BSDFs require non-overlapping spectral ranges.
    #[error("composite: overlapping wavenumber ranges")]
    OverlappingRanges,

    /// A scene-description node could not be parsed into the target type.
    #[error("loader: {0}")]
    Loader(String),
}
