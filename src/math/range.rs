//! Closed scalar intervals with union/intersection algebra.

use super::{Float, Wavenumber};
use std::ops::{Add, BitAnd, BitAndAssign, BitOr, BitOrAssign, Mul, Sub};

/// Value types a `Range` can be formed over.
pub trait RangeValue:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Float, Output = Self>
{
    const ZERO: Self;
    const INF: Self;
    const NEG_INF: Self;
}

impl RangeValue for Float {
    const ZERO: Self = 0.0;
    const INF: Self = Float::INFINITY;
    const NEG_INF: Self = Float::NEG_INFINITY;
}

/// A closed interval `[min, max]`. An empty range has `min > max`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Range<T: RangeValue = Float> {
    pub min: T,
    pub max: T,
}

/// Range of wavenumbers.
pub type WavenumberRange = Range<Wavenumber>;

impl<T: RangeValue> Range<T> {
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// The empty range.
    #[inline]
    pub fn null() -> Self {
        Self {
            min: T::INF,
            max: T::NEG_INF,
        }
    }

    /// The full real line.
    #[inline]
    pub fn all() -> Self {
        Self {
            min: T::NEG_INF,
            max: T::INF,
        }
    }

    /// All non-negative values.
    #[inline]
    pub fn positive() -> Self {
        Self {
            min: T::ZERO,
            max: T::INF,
        }
    }

    /// A degenerate single-point range.
    #[inline]
    pub fn point(x: T) -> Self {
        Self { min: x, max: x }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    #[inline]
    pub fn length(&self) -> T {
        if self.is_empty() {
            T::ZERO
        } else {
            self.max - self.min
        }
    }

    #[inline]
    pub fn centre(&self) -> T {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn contains(&self, x: T) -> bool {
        self.min <= x && x <= self.max
    }

    /// Left-inclusive containment, `min <= x < max`. Used by composite maps
    /// whose sub-ranges abut.
    #[inline]
    pub fn contains_left_inclusive(&self, x: T) -> bool {
        self.min <= x && x < self.max
    }

    #[inline]
    pub fn overlaps(&self, o: &Self) -> bool {
        !self.is_empty() && !o.is_empty() && self.min <= o.max && o.min <= self.max
    }

    /// Grows the range by `d` on both ends.
    #[inline]
    pub fn grow(&self, d: T) -> Self {
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }

    /// Intersection of two ranges.
    #[inline]
    pub fn intersect(&self, o: &Self) -> Self {
        Self {
            min: if self.min > o.min { self.min } else { o.min },
            max: if self.max < o.max { self.max } else { o.max },
        }
    }

    /// Union (smallest range containing both).
    #[inline]
    pub fn union(&self, o: &Self) -> Self {
        if self.is_empty() {
            return *o;
        }
        if o.is_empty() {
            return *self;
        }
        Self {
            min: if self.min < o.min { self.min } else { o.min },
            max: if self.max > o.max { self.max } else { o.max },
        }
    }
}

impl<T: RangeValue> BitAnd for Range<T> {
    type Output = Self;
    #[inline]
    fn bitand(self, o: Self) -> Self {
        self.intersect(&o)
    }
}

impl<T: RangeValue> BitAndAssign for Range<T> {
    #[inline]
    fn bitand_assign(&mut self, o: Self) {
        *self = self.intersect(&o);
    }
}

impl<T: RangeValue> BitOr for Range<T> {
    type Output = Self;
    #[inline]
    fn bitor(self, o: Self) -> Self {
        self.union(&o)
    }
}

impl<T: RangeValue> BitOrAssign for Range<T> {
    #[inline]
    fn bitor_assign(&mut self, o: Self) {
        *self = self.union(&o);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_algebra() {
        let a = Range::new(0.0, 2.0);
        let b = Range::new(1.0, 3.0);
        assert_eq!((a & b), Range::new(1.0, 2.0));
        assert_eq!((a | b), Range::new(0.0, 3.0));
        assert!(a.overlaps(&b));
        assert_eq!(a.length(), 2.0);
        assert_eq!(a.centre(), 1.0);
    }

    #[test]
    fn empty_ranges() {
        let n = Range::<Float>::null();
        assert!(n.is_empty());
        assert_eq!(n.length(), 0.0);
        let a = Range::new(0.0, 1.0);
        assert_eq!((a | n), a);
        assert!((a & Range::new(2.0, 3.0)).is_empty());
    }

    #[test]
    fn left_inclusive() {
        let r = Range::new(1.0, 2.0);
        assert!(r.contains_left_inclusive(1.0));
        assert!(!r.contains_left_inclusive(2.0));
        assert!(r.contains(2.0));
    }
}
