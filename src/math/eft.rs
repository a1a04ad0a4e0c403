//! Error-free transforms.
//!
//! Used where catastrophic cancellation matters, e.g. the quadratic setup of
//! the cone kernels and cross-product-like expressions.

use super::{Float, Vec3};

/// `a*b` with the rounding error recovered via fused multiply-add.
#[inline]
pub fn two_prod(a: Float, b: Float) -> (Float, Float) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

/// `a+b` with the rounding error (Knuth's branch-free two-sum).
#[inline]
pub fn two_sum(a: Float, b: Float) -> (Float, Float) {
    let s = a + b;
    let v = s - a;
    let e = (a - (s - v)) + (b - v);
    (s, e)
}

/// Accurate `a*b - c*d`.
#[inline]
pub fn diff_prod(a: Float, b: Float, c: Float, d: Float) -> Float {
    let cd = c * d;
    let err = (-c).mul_add(d, cd);
    let dop = a.mul_add(b, -cd);
    dop + err
}

/// Accurate `a*b + c*d`.
#[inline]
pub fn sum_prod(a: Float, b: Float, c: Float, d: Float) -> Float {
    diff_prod(a, b, -c, d)
}

/// Compensated dot product of two 3-vectors.
#[inline]
pub fn dot_eft(a: &Vec3, b: &Vec3) -> Float {
    let (p0, e0) = two_prod(a.x, b.x);
    let (p1, e1) = two_prod(a.y, b.y);
    let (p2, e2) = two_prod(a.z, b.z);
    let (s01, c01) = two_sum(p0, p1);
    let (s, c) = two_sum(s01, p2);
    s + (c + c01 + e0 + e1 + e2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_prod_cancellation() {
        // a*b and c*d nearly equal; the naive difference loses all digits
        let a = 1.0 + 1e-8;
        let b = 1.0 - 1e-8;
        let v = diff_prod(a, b, 1.0, 1.0);
        assert!((v - (-1e-16)).abs() < 1e-24);
    }

    #[test]
    fn two_sum_exact() {
        let (s, e) = two_sum(1e16, 1.0);
        assert_eq!(s + e, 1e16 + 1.0);
        assert_eq!(e, 1.0 - ((1e16 + 1.0) - 1e16));
    }
}
