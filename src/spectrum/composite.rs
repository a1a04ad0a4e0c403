//! Composite spectrum: disjoint spectral ranges stitched together.

use super::{ArcSpectrumReal, Spectrum, SpectrumReal};
use crate::math::distribution::Distribution1D;
use crate::math::{Complex, Float, Range, Wavenumber, WavenumberRange};
use crate::{Error, Result};

/// A composition of one or more real-valued spectra, each defined over a
/// distinct (left-inclusive) spectral range. Ranges must not overlap.
pub struct CompositeSpectrum {
    // sorted by range start; lookup is a lower-bound on the interval ends
    spectra: Vec<(WavenumberRange, ArcSpectrumReal)>,
    range: WavenumberRange,
    mean: Wavenumber,
    power: Float,
}

impl CompositeSpectrum {
    pub fn new(mut spectra: Vec<(WavenumberRange, ArcSpectrumReal)>) -> Result<Self> {
        spectra.sort_by(|a, b| a.0.min.partial_cmp(&b.0.min).unwrap());

        let mut range = WavenumberRange::null();
        let mut power = 0.0;
        let mut mean = Wavenumber::ZERO;
        for (i, (r, s)) in spectra.iter().enumerate() {
            if i > 0 && spectra[i - 1].0.max > r.min {
                return Err(Error::OverlappingRanges);
            }
            range |= *r;

            let p = s.power_over(r);
            power += p;
            mean += s.mean_wavenumber() * p;
        }

        Ok(Self {
            spectra,
            range,
            mean: if power > 0.0 {
                mean / power
            } else {
                Wavenumber::ZERO
            },
            power,
        })
    }

    // lower-bound over the interval set with the strict `max <= k`
    // comparator, then a left-inclusive containment check
    fn lookup(&self, k: Wavenumber) -> Option<&ArcSpectrumReal> {
        let idx = self.spectra.partition_point(|(r, _)| r.max <= k);
        match self.spectra.get(idx) {
            Some((r, s)) if r.contains_left_inclusive(k) => Some(s),
            _ => None,
        }
    }
}

impl Spectrum for CompositeSpectrum {
    fn wavenumber_range(&self) -> WavenumberRange {
        self.range
    }

    fn value(&self, k: Wavenumber) -> Complex {
        Complex::from_real(self.f(k))
    }
}

impl SpectrumReal for CompositeSpectrum {
    /// Composites have no aggregate distribution.
    fn distribution(&self) -> Option<&Distribution1D> {
        None
    }

    fn power(&self) -> Float {
        self.power
    }

    fn power_over(&self, range: &WavenumberRange) -> Float {
        self.spectra
            .iter()
            .map(|(r, s)| s.power_over(&(*range & *r)))
            .sum()
    }

    fn mean_wavenumber(&self) -> Wavenumber {
        self.mean
    }

    /// Queries the covering sub-spectrum; wavenumbers outside every
    /// sub-range yield 0.
    fn f(&self, k: Wavenumber) -> Float {
        self.lookup(k).map_or(0.0, |s| s.f(k))
    }
}
