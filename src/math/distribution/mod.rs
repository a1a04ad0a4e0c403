//! 1-D distributions and the product-distribution algebra.

mod binned_piecewise_linear;
mod discrete;
mod gaussian1d;
mod piecewise_linear;
mod product;
mod truncated_gaussian1d;
mod uniform;

pub use binned_piecewise_linear::*;
pub use discrete::*;
pub use gaussian1d::*;
pub use piecewise_linear::*;
pub use product::*;
pub use truncated_gaussian1d::*;
pub use uniform::*;

use crate::math::{mix, Float, Range};
use crate::sampler::{Measure, Sampler};

/// A point sampled from a 1-D distribution.
#[derive(Copy, Clone, Debug)]
pub struct Sample1D {
    /// Sampled point.
    pub x: Float,
    /// Measure of the sampled point.
    pub measure: Measure,
    /// Sampling density w.r.t. `measure`.
    pub pdf: Float,
}

/// The closed set of 1-D distributions. All spectral sampling machinery
/// dispatches over these variants.
#[derive(Clone, Debug)]
pub enum Distribution1D {
    Uniform(UniformDistribution),
    PiecewiseLinear(PiecewiseLinearDistribution),
    BinnedPiecewiseLinear(BinnedPiecewiseLinearDistribution),
    Discrete(DiscreteDistribution),
    Gaussian(Gaussian1D),
    TruncatedGaussian(TruncatedGaussian1D),
}

impl Distribution1D {
    /// PDF of the distribution at `x` w.r.t. `measure`.
    pub fn pdf(&self, x: Float, measure: Measure) -> Float {
        match self {
            Self::Uniform(d) => d.pdf(x, measure),
            Self::PiecewiseLinear(d) => d.pdf(x, measure),
            Self::BinnedPiecewiseLinear(d) => d.pdf(x, measure),
            Self::Discrete(d) => d.pdf(x, measure),
            Self::Gaussian(d) => d.pdf(x, measure),
            Self::TruncatedGaussian(d) => d.pdf(x, measure),
        }
    }

    /// Samples a point.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> Sample1D {
        match self {
            Self::Uniform(d) => d.sample(sampler),
            Self::PiecewiseLinear(d) => d.sample(sampler),
            Self::BinnedPiecewiseLinear(d) => d.sample(sampler),
            Self::Discrete(d) => d.sample(sampler),
            Self::Gaussian(d) => d.sample(sampler),
            Self::TruncatedGaussian(d) => d.sample(sampler),
        }
    }

    /// Tabulates the continuous pdf over `range` into `bins` equal cells;
    /// discrete distributions accumulate atom masses into the covering cell.
    pub fn tabulate(&self, range: &Range, bins: usize) -> Vec<Float> {
        if let Self::Discrete(d) = self {
            return d.tabulate(range, bins);
        }
        let rcp = 1.0 / bins as Float;
        (0..bins)
            .map(|i| {
                self.pdf(
                    mix(range.min, range.max, (i as Float + 0.5) * rcp),
                    Measure::Continuous,
                )
            })
            .collect()
    }
}
