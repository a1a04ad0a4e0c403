//! BSDF query and result types.

use crate::interaction::{IntersectionSurface, MuellerOperator};
use crate::math::{Dir3, Float, Wavenumber};
use crate::sampler::Measure;

/// Mode of light transport.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Transport {
    /// Emitter to sensor transport.
    Forward,
    /// Sensor to emitter transport.
    Backward,
}

impl Transport {
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Mask over a BSDF's lobes (up to 32).
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct LobeMask(u32);

impl LobeMask {
    pub const COUNT: u32 = 32;

    /// No lobes.
    #[inline]
    pub fn none() -> Self {
        Self(0)
    }

    /// All lobes.
    #[inline]
    pub fn all() -> Self {
        Self(u32::MAX)
    }

    /// A mask with the single lobe `l` set.
    #[inline]
    pub fn lobe(l: u32) -> Self {
        Self(1 << l)
    }

    #[inline]
    pub fn set(&mut self, l: u32) {
        self.0 |= 1 << l;
    }

    #[inline]
    pub fn test(&self, l: u32) -> bool {
        self.0 & (1 << l) != 0
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Highest unset lobe slot, if any.
    pub fn highest_free(&self) -> Option<u32> {
        for l in (0..Self::COUNT).rev() {
            if !self.test(l) {
                return Some(l);
            }
        }
        None
    }
}

/// Data for a BSDF evaluation.
#[derive(Copy, Clone)]
pub struct BsdfQuery<'a> {
    pub intersection: &'a IntersectionSurface,
    /// Wavenumber.
    pub k: Wavenumber,
    pub transport: Transport,
    /// Lobes the query is restricted to.
    pub lobes: LobeMask,
}

impl<'a> BsdfQuery<'a> {
    pub fn new(intersection: &'a IntersectionSurface, k: Wavenumber, transport: Transport) -> Self {
        Self {
            intersection,
            k,
            transport,
            lobes: LobeMask::all(),
        }
    }
}

/// The BSDF of a polarimetric light-matter interaction, quantified by a
/// Mueller operator.
#[derive(Copy, Clone, Default, Debug)]
pub struct BsdfResult {
    pub m: MuellerOperator,
}

impl BsdfResult {
    pub const POLARIMETRIC: bool = true;

    #[inline]
    pub fn zero() -> Self {
        Self {
            m: MuellerOperator::zero(),
        }
    }

    #[inline]
    pub fn mean_intensity(&self) -> Float {
        self.m.mean_intensity()
    }
}

/// Sampling density of a BSDF sample, with its measure. Delta lobes carry
/// discrete probability mass; everything else a solid-angle density.
#[derive(Copy, Clone, Debug)]
pub struct SolidAngleSample {
    pub density: Float,
    pub measure: Measure,
}

impl SolidAngleSample {
    #[inline]
    pub fn continuous(density: Float) -> Self {
        Self {
            density,
            measure: Measure::Continuous,
        }
    }

    #[inline]
    pub fn discrete(mass: Float) -> Self {
        Self {
            density: mass,
            measure: Measure::Discrete,
        }
    }
}

/// Sample returned from a `Bsdf::sample` query.
#[derive(Copy, Clone, Debug)]
pub struct BsdfSample {
    pub wo: Dir3,
    pub dpd: SolidAngleSample,
    /// Relative IOR across the sampled interaction.
    pub eta: Float,
    /// The sampled lobe.
    pub lobe: LobeMask,
    /// bsdf / pdf.
    pub weighted_bsdf: BsdfResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobe_mask_ops() {
        let mut m = LobeMask::none();
        assert!(m.is_empty());
        m.set(0);
        m.set(5);
        assert!(m.test(0) && m.test(5) && !m.test(1));
        assert_eq!(m.count(), 2);
        assert_eq!(m.highest_free(), Some(31));
        assert_eq!(LobeMask::all().highest_free(), None);
    }
}
