//! Spectrally composited BSDF.

use super::{ArcBsdf, Bsdf, BsdfQuery, BsdfResult, BsdfSample, LobeMask};
use crate::math::{Dir3, Float, SolidAngleDensity, Wavenumber, WavenumberRange};
use crate::sampler::Sampler;
use crate::{Error, Result};

/// A composition of one or more BSDFs, each defined over a distinct
/// (left-inclusive) spectral range. Ranges must not overlap; queries
/// outside every range return empty/unit responses.
pub struct CompositeBsdf {
    bsdfs: Vec<(WavenumberRange, ArcBsdf)>,
    range: WavenumberRange,
}

impl CompositeBsdf {
    pub fn new(mut bsdfs: Vec<(WavenumberRange, ArcBsdf)>) -> Result<Self> {
        bsdfs.sort_by(|a, b| a.0.min.partial_cmp(&b.0.min).unwrap());

        let mut range = WavenumberRange::null();
        for (i, (r, _)) in bsdfs.iter().enumerate() {
            if i > 0 && bsdfs[i - 1].0.max > r.min {
                return Err(Error::OverlappingRanges);
            }
            range |= *r;
        }

        Ok(Self { bsdfs, range })
    }

    #[inline]
    pub fn wavenumber_range(&self) -> WavenumberRange {
        self.range
    }

    fn lookup(&self, k: Wavenumber) -> Option<&ArcBsdf> {
        let idx = self.bsdfs.partition_point(|(r, _)| r.max <= k);
        match self.bsdfs.get(idx) {
            Some((r, b)) if r.contains_left_inclusive(k) => Some(b),
            _ => None,
        }
    }
}

impl Bsdf for CompositeBsdf {
    /// Uncovered wavenumbers report a zero albedo (not `None`).
    fn albedo(&self, k: Wavenumber) -> Option<Float> {
        match self.lookup(k) {
            Some(b) => b.albedo(k),
            None => Some(0.0),
        }
    }

    fn lobes(&self, k: Wavenumber) -> LobeMask {
        self.lookup(k).map_or(LobeMask::none(), |b| b.lobes(k))
    }

    fn is_delta_only(&self, k: Wavenumber) -> bool {
        self.lookup(k).map_or(true, |b| b.is_delta_only(k))
    }

    fn is_delta_lobe(&self, k: Wavenumber, lobe: u32) -> bool {
        self.lookup(k).map_or(true, |b| b.is_delta_lobe(k, lobe))
    }

    fn needs_interaction_footprint(&self) -> bool {
        self.bsdfs.iter().any(|(_, b)| b.needs_interaction_footprint())
    }

    fn f(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> BsdfResult {
        self.lookup(query.k)
            .map_or_else(BsdfResult::zero, |b| b.f(wi, wo, query))
    }

    fn sample(
        &self,
        wi: &Dir3,
        query: &BsdfQuery,
        sampler: &mut dyn Sampler,
    ) -> Option<BsdfSample> {
        self.lookup(query.k)?.sample(wi, query, sampler)
    }

    fn pdf(&self, wi: &Dir3, wo: &Dir3, query: &BsdfQuery) -> SolidAngleDensity {
        self.lookup(query.k).map_or(0.0, |b| b.pdf(wi, wo, query))
    }

    fn eta(&self, wi: &Dir3, wo: &Dir3, k: Wavenumber) -> Float {
        self.lookup(k).map_or(1.0, |b| b.eta(wi, wo, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::tests::surface;
    use crate::bsdf::{DiffuseBsdf, Transport};
    use crate::math::Range;
    use crate::texture::ConstantTexture;
    use std::sync::Arc;

    fn kr(a: Float, b: Float) -> WavenumberRange {
        Range::new(Wavenumber::from_inv_mm(a), Wavenumber::from_inv_mm(b))
    }

    fn diffuse(refl: Float) -> ArcBsdf {
        Arc::new(DiffuseBsdf::new(Arc::new(ConstantTexture::new(refl))))
    }

    #[test]
    fn dispatches_by_wavenumber() {
        let b = CompositeBsdf::new(vec![(kr(0.0, 100.0), diffuse(0.2)), (kr(100.0, 200.0), diffuse(0.9))])
            .unwrap();
        let isect = surface();
        let wi = Dir3::new(0.0, 0.0, 1.0);
        let wo = Dir3::new(0.1, 0.0, 0.995).normalize();

        let lo = Wavenumber::from_inv_mm(50.0);
        let hi = Wavenumber::from_inv_mm(150.0);
        let q_lo = BsdfQuery::new(&isect, lo, Transport::Backward);
        let q_hi = BsdfQuery::new(&isect, hi, Transport::Backward);
        assert!(b.f(&wi, &wo, &q_lo).mean_intensity() < b.f(&wi, &wo, &q_hi).mean_intensity());
        assert_eq!(b.albedo(lo), Some(0.2));
    }

    #[test]
    fn miss_returns_empty_responses() {
        let b = CompositeBsdf::new(vec![(kr(0.0, 100.0), diffuse(0.5))]).unwrap();
        let isect = surface();
        let k = Wavenumber::from_inv_mm(500.0);
        let q = BsdfQuery::new(&isect, k, Transport::Backward);
        let wi = Dir3::new(0.0, 0.0, 1.0);

        // 0-on-miss albedo, empty lobes, zero response
        assert_eq!(b.albedo(k), Some(0.0));
        assert!(b.lobes(k).is_empty());
        assert_eq!(b.f(&wi, &wi, &q).mean_intensity(), 0.0);
        assert_eq!(b.pdf(&wi, &wi, &q), 0.0);
        assert_eq!(b.eta(&wi, &wi, k), 1.0);
        let mut s = crate::sampler::UniformSampler::new(1);
        assert!(b.sample(&wi, &q, &mut s).is_none());
    }

    #[test]
    fn rejects_overlap() {
        assert!(CompositeBsdf::new(vec![
            (kr(0.0, 100.0), diffuse(0.5)),
            (kr(50.0, 150.0), diffuse(0.5)),
        ])
        .is_err());
    }
}
