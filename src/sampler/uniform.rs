//! Default sampler backed by a small, seedable RNG.

use super::Sampler;
use crate::math::{Float, TWO_PI};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Independent uniform sampler. Cheap to construct per worker thread;
/// seedable for reproducible tests.
pub struct UniformSampler {
    rng: SmallRng,
    // Box-Muller produces pairs; the spare is cached.
    spare_normal: Option<Float>,
}

impl UniformSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            spare_normal: None,
        }
    }
}

impl Sampler for UniformSampler {
    fn r(&mut self) -> Float {
        self.rng.gen::<Float>()
    }

    fn normal(&mut self) -> Float {
        if let Some(v) = self.spare_normal.take() {
            return v;
        }
        let u1: Float = (1.0 - self.rng.gen::<Float>()).max(Float::MIN_POSITIVE);
        let u2: Float = self.rng.gen();
        let r = (-2.0 * u1.ln()).sqrt();
        let (s, c) = (TWO_PI * u2).sin_cos();
        self.spare_normal = Some(r * s);
        r * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_in_range() {
        let mut s = UniformSampler::new(7);
        for _ in 0..1000 {
            let v = s.r();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn normal_moments() {
        let mut s = UniformSampler::new(42);
        let n = 200_000;
        let (mut sum, mut sum2) = (0.0, 0.0);
        for _ in 0..n {
            let v = s.normal();
            sum += v;
            sum2 += v * v;
        }
        let mean = sum / n as Float;
        let var = sum2 / n as Float - mean * mean;
        assert!(mean.abs() < 0.01, "mean {mean}");
        assert!((var - 1.0).abs() < 0.02, "var {var}");
    }
}
