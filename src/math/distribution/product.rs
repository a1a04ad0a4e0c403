//! Product-distribution algebra.
//!
//! For two independent densities `f`, `g` the normalised product is
//! `h(x) = f(x)g(x) / R0` with `R0 = ∫ f(x)g(x) dx` — the cross-correlation
//! of the densities at zero lag, quantifying their similarity. The result
//! is always one of: discrete, piecewise-linear, or uniform.

use super::{
    BinnedPiecewiseLinearDistribution, DiscreteDistribution, Distribution1D, Gaussian1D,
    PiecewiseLinearDistribution, TruncatedGaussian1D, UniformDistribution,
};
use crate::math::{mix, Float, Vec2};
use crate::sampler::Measure;

/// A computed product distribution.
#[derive(Clone, Debug)]
pub struct ProductDistribution {
    /// The normalised product density. Always a discrete, piecewise-linear
    /// or uniform variant.
    pub dist: Distribution1D,
    /// The normalisation factor `R0 ∈ [0, 1]`.
    pub r0: Float,
    /// Set when the computed product is approximative.
    pub approximate: bool,
    /// Set when both inputs (and therefore the product) are discrete.
    pub discrete: bool,
}

// Gaussian-like inputs contribute candidate positions at mean ± 5σ,
// sampled at 6 points per standard deviation.
const PTS_PER_STDDEV: i32 = 6;
const STDDEVS: i32 = 5;

fn gaussian_candidates(mean: Float, std_dev: Float) -> Vec<Float> {
    let mut xs = Vec::with_capacity(((2 * STDDEVS + 1) * PTS_PER_STDDEV) as usize);
    for s in -STDDEVS..STDDEVS {
        let pts = PTS_PER_STDDEV + if s == STDDEVS - 1 { 1 } else { 0 };
        for p in 0..pts {
            xs.push(mean + std_dev * (s as Float + p as Float / PTS_PER_STDDEV as Float));
        }
    }
    xs
}

// Merges two sorted candidate lists.
fn sorted_candidates(v1: &[Float], v2: &[Float]) -> Vec<Float> {
    let mut vs = Vec::with_capacity(v1.len() + v2.len());
    let (mut i, mut j) = (0, 0);
    while i < v1.len() || j < v2.len() {
        if i < v1.len() && (j == v2.len() || v1[i] <= v2[j]) {
            vs.push(v1[i]);
            i += 1;
        } else {
            vs.push(v2[j]);
            j += 1;
        }
    }
    vs
}

fn pwl_knot_xs(d: &PiecewiseLinearDistribution) -> Vec<Float> {
    d.knots().iter().map(|k| k.x).collect()
}

fn binned_knot_xs(d: &BinnedPiecewiseLinearDistribution) -> Vec<Float> {
    let recp = 1.0 / (d.len() - 1) as Float;
    (0..d.len())
        .map(|i| mix(d.range().min, d.range().max, i as Float * recp))
        .collect()
}

fn make_pwl_product(bins: Vec<Vec2>) -> ProductDistribution {
    let bins = if bins.len() <= 1 {
        debug_assert!(false);
        vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]
    } else {
        bins
    };

    let dist = PiecewiseLinearDistribution::new(bins);
    let r0 = dist.total();
    debug_assert!((0.0..=1.0 + 1e-6).contains(&r0));

    ProductDistribution {
        dist: Distribution1D::PiecewiseLinear(dist),
        r0,
        approximate: true,
        discrete: false,
    }
}

// Evaluates both pdfs at the candidate positions; when `subdivide` is set a
// midpoint is inserted per interval to better capture the quadratic shape
// of a product of two linear pieces.
fn sample_product_pwl(
    xs: &[Float],
    subdivide: bool,
    skip_non_finite: bool,
    pdf1: impl Fn(Float) -> Float,
    pdf2: impl Fn(Float) -> Float,
) -> ProductDistribution {
    let pts: usize = 2;
    let mut bins = Vec::with_capacity(if subdivide {
        pts * xs.len().saturating_sub(1) + 1
    } else {
        xs.len()
    });

    for (i, &x) in xs.iter().enumerate() {
        if skip_non_finite && !x.is_finite() {
            continue;
        }
        bins.push(Vec2::new(x, pdf1(x) * pdf2(x)));

        if subdivide && i + 1 < xs.len() {
            for p in 1..pts {
                let xm = mix(x, xs[i + 1], p as Float / pts as Float);
                bins.push(Vec2::new(xm, pdf1(xm) * pdf2(xm)));
            }
        }
    }

    make_pwl_product(bins)
}

// Discrete × continuous: atoms keep their positions, masses are modulated
// by the continuous density. `skip_zero` drops zero-mass products (used
// against Gaussians whose support is effectively bounded).
fn discrete_times_continuous(
    pm: &DiscreteDistribution,
    skip_non_finite: bool,
    skip_zero: bool,
    pdf2: impl Fn(Float) -> Float,
) -> ProductDistribution {
    let mut bins = Vec::with_capacity(pm.len());
    let mut r0 = 0.0;
    for (i, a) in pm.atoms().iter().enumerate() {
        if skip_non_finite && !a.x.is_finite() {
            continue;
        }
        let p = pm.pdf_index(i) * pdf2(a.x);
        r0 += p;
        if !skip_zero || p > 0.0 {
            bins.push(Vec2::new(a.x, p));
        }
    }
    if bins.is_empty() {
        bins.push(Vec2::new(0.0, 0.0));
    }

    ProductDistribution {
        dist: Distribution1D::Discrete(DiscreteDistribution::new(bins)),
        r0,
        approximate: false,
        discrete: false,
    }
}

fn discrete_discrete(f: &DiscreteDistribution, g: &DiscreteDistribution) -> ProductDistribution {
    let mut bins = Vec::with_capacity(f.len().max(g.len()));
    let mut r0 = 0.0;
    for a in f.atoms() {
        for b in g.atoms() {
            if a.x == b.x {
                let p = f.pdf(a.x, Measure::Discrete) * g.pdf(b.x, Measure::Discrete);
                r0 += p;
                bins.push(Vec2::new(a.x, p));
            }
        }
    }
    if bins.is_empty() {
        bins.push(Vec2::new(0.0, 0.0));
    }

    ProductDistribution {
        dist: Distribution1D::Discrete(DiscreteDistribution::new(bins)),
        r0,
        approximate: false,
        discrete: true,
    }
}

fn uniform_uniform(d1: &UniformDistribution, d2: &UniformDistribution) -> ProductDistribution {
    let r1 = *d1.range();
    let r2 = *d2.range();
    let overlap = r1 & r2;

    let r0 = if r1.length() > 0.0 && r2.length() > 0.0 {
        overlap.length() / (r1.length() * r2.length())
    } else {
        0.0
    };

    ProductDistribution {
        dist: Distribution1D::Uniform(UniformDistribution::new(overlap)),
        r0,
        approximate: false,
        discrete: false,
    }
}

/// Computes the normalised product of two independent distributions.
/// The dispatch is exhaustive over all 6×6 variant pairs.
pub fn product_distribution(f: &Distribution1D, g: &Distribution1D) -> ProductDistribution {
    use Distribution1D as D;

    // The discrete variant absorbs everything it is multiplied with.
    match (f, g) {
        (D::Discrete(a), D::Discrete(b)) => return discrete_discrete(a, b),
        (D::Discrete(a), _) => return discrete_times_other(a, g),
        (_, D::Discrete(b)) => return discrete_times_other(b, f),
        _ => {}
    }

    match (f, g) {
        (D::Uniform(a), D::Uniform(b)) => uniform_uniform(a, b),

        (D::PiecewiseLinear(a), D::PiecewiseLinear(b)) => sample_product_pwl(
            &sorted_candidates(&pwl_knot_xs(a), &pwl_knot_xs(b)),
            true,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),
        (D::PiecewiseLinear(a), D::BinnedPiecewiseLinear(b))
        | (D::BinnedPiecewiseLinear(b), D::PiecewiseLinear(a)) => sample_product_pwl(
            &sorted_candidates(&pwl_knot_xs(a), &binned_knot_xs(b)),
            true,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),
        (D::BinnedPiecewiseLinear(a), D::BinnedPiecewiseLinear(b)) => sample_product_pwl(
            &sorted_candidates(&binned_knot_xs(a), &binned_knot_xs(b)),
            true,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),

        (D::PiecewiseLinear(a), D::Uniform(b)) | (D::Uniform(b), D::PiecewiseLinear(a)) => {
            sample_product_pwl(
                &sorted_candidates(&pwl_knot_xs(a), &[b.range().min, b.range().max]),
                false,
                true,
                |x| a.pdf(x, Measure::Continuous),
                |x| b.pdf(x, Measure::Continuous),
            )
        }
        (D::BinnedPiecewiseLinear(a), D::Uniform(b))
        | (D::Uniform(b), D::BinnedPiecewiseLinear(a)) => sample_product_pwl(
            &sorted_candidates(&binned_knot_xs(a), &[b.range().min, b.range().max]),
            false,
            true,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),

        (D::PiecewiseLinear(a), D::Gaussian(b)) | (D::Gaussian(b), D::PiecewiseLinear(a)) => {
            sample_product_pwl(
                &sorted_candidates(&pwl_knot_xs(a), &gaussian_candidates(b.mean(), b.std_dev())),
                false,
                false,
                |x| a.pdf(x, Measure::Continuous),
                |x| b.pdf(x, Measure::Continuous),
            )
        }
        (D::PiecewiseLinear(a), D::TruncatedGaussian(b))
        | (D::TruncatedGaussian(b), D::PiecewiseLinear(a)) => sample_product_pwl(
            &sorted_candidates(&pwl_knot_xs(a), &gaussian_candidates(b.mean(), b.std_dev())),
            false,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),
        (D::BinnedPiecewiseLinear(a), D::Gaussian(b))
        | (D::Gaussian(b), D::BinnedPiecewiseLinear(a)) => sample_product_pwl(
            &sorted_candidates(&binned_knot_xs(a), &gaussian_candidates(b.mean(), b.std_dev())),
            false,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),
        (D::BinnedPiecewiseLinear(a), D::TruncatedGaussian(b))
        | (D::TruncatedGaussian(b), D::BinnedPiecewiseLinear(a)) => sample_product_pwl(
            &sorted_candidates(&binned_knot_xs(a), &gaussian_candidates(b.mean(), b.std_dev())),
            false,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),

        (D::Gaussian(a), D::Gaussian(b)) => sample_product_pwl(
            &sorted_candidates(
                &gaussian_candidates(a.mean(), a.std_dev()),
                &gaussian_candidates(b.mean(), b.std_dev()),
            ),
            false,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),
        (D::Gaussian(a), D::TruncatedGaussian(b)) | (D::TruncatedGaussian(b), D::Gaussian(a)) => {
            sample_product_pwl(
                &sorted_candidates(
                    &gaussian_candidates(a.mean(), a.std_dev()),
                    &gaussian_candidates(b.mean(), b.std_dev()),
                ),
                false,
                false,
                |x| a.pdf(x, Measure::Continuous),
                |x| b.pdf(x, Measure::Continuous),
            )
        }
        (D::TruncatedGaussian(a), D::TruncatedGaussian(b)) => sample_product_pwl(
            &sorted_candidates(
                &gaussian_candidates(a.mean(), a.std_dev()),
                &gaussian_candidates(b.mean(), b.std_dev()),
            ),
            false,
            false,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),

        (D::Gaussian(a), D::Uniform(b)) | (D::Uniform(b), D::Gaussian(a)) => sample_product_pwl(
            &sorted_candidates(
                &gaussian_candidates(a.mean(), a.std_dev()),
                &[b.range().min, b.range().max],
            ),
            false,
            true,
            |x| a.pdf(x, Measure::Continuous),
            |x| b.pdf(x, Measure::Continuous),
        ),
        (D::TruncatedGaussian(a), D::Uniform(b)) | (D::Uniform(b), D::TruncatedGaussian(a)) => {
            sample_product_pwl(
                &sorted_candidates(
                    &gaussian_candidates(a.mean(), a.std_dev()),
                    &[b.range().min, b.range().max],
                ),
                false,
                true,
                |x| a.pdf(x, Measure::Continuous),
                |x| b.pdf(x, Measure::Continuous),
            )
        }

        // every pair is handled above
        (D::Discrete(_), _) | (_, D::Discrete(_)) => unreachable!(),
    }
}

fn discrete_times_other(pm: &DiscreteDistribution, other: &Distribution1D) -> ProductDistribution {
    use Distribution1D as D;
    match other {
        D::Uniform(d) => {
            discrete_times_continuous(pm, true, false, |x| d.pdf(x, Measure::Continuous))
        }
        D::PiecewiseLinear(d) => {
            discrete_times_continuous(pm, false, false, |x| d.pdf(x, Measure::Continuous))
        }
        D::BinnedPiecewiseLinear(d) => {
            discrete_times_continuous(pm, false, false, |x| d.pdf(x, Measure::Continuous))
        }
        D::Gaussian(d) => {
            discrete_times_continuous(pm, false, true, |x| d.pdf(x, Measure::Continuous))
        }
        D::TruncatedGaussian(d) => {
            discrete_times_continuous(pm, false, true, |x| d.pdf(x, Measure::Continuous))
        }
        D::Discrete(_) => unreachable!(),
    }
}
