use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use dashu_float::round::mode::HalfAway;
use dashu_float::{DBig, FBig};

use crate::error::CoreError;

/// Binary precision a decimal literal is rounded to before it is split.
const PARSE_PRECISION_BITS: usize = 192;

/// `hi + lo` with `|lo| ≤ ½ ulp(hi)`: about 106 significant bits.
///
/// Addition is the accurate two-sum variant (both halves summed, two
/// renormalizations). Multiplication takes the exact `hi·hi` error from an
/// FMA and drops `lo·lo`. See Hida, Li & Bailey (2001) for the algorithms.
#[derive(Debug, Clone, Copy)]
pub struct DoubleDouble {
    pub hi: f64,
    pub lo: f64,
}

/// `(s, e)` with `s = fl(a + b)` and `s + e = a + b` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let b_virtual = s - a;
    let a_virtual = s - b_virtual;
    (s, (a - a_virtual) + (b - b_virtual))
}

/// [`two_sum`] for `|a| ≥ |b|`.
#[inline]
fn fast_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    (s, b - (s - a))
}

/// `(p, e)` with `p = fl(a · b)` and `p + e = a · b` exactly.
///
/// `e` has to come from `mul_add`: `a * b - p` rounds the product the same
/// way twice and always yields zero.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

impl DoubleDouble {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };

    #[inline]
    pub fn new(hi: f64, lo: f64) -> Self {
        Self { hi, lo }
    }

    #[inline]
    fn renormalized(hi: f64, lo: f64) -> Self {
        let (hi, lo) = fast_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Parse a decimal literal to full double-double precision.
    ///
    /// `hi` is the double nearest to the literal and `lo` the nearest double
    /// to what is left, both taken from a 192-bit binary rounding of the
    /// decimal value.
    pub fn from_decimal_str(literal: &str) -> crate::Result<Self> {
        let invalid = |reason: String| CoreError::InvalidDecimal {
            literal: literal.to_owned(),
            reason,
        };

        let exact = literal
            .trim()
            .parse::<DBig>()
            .map_err(|e| invalid(e.to_string()))?
            .with_base_and_precision::<2>(PARSE_PRECISION_BITS)
            .value();

        let hi = exact.to_f64().value();
        if !hi.is_finite() {
            return Err(invalid("out of f64 range".to_owned()));
        }
        let hi_exact = FBig::<HalfAway, 2>::try_from(hi).map_err(|e| invalid(format!("{e:?}")))?;
        let lo = (&exact - &hi_exact).to_f64().value();
        Ok(Self { hi, lo })
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    /// `(head, tail)` in single precision, `head + tail ≈ self` to ~48 bits.
    pub fn to_f32_pair(self) -> (f32, f32) {
        let head = self.hi as f32;
        let tail = (self - Self::from(f64::from(head))).to_f64() as f32;
        (head, tail)
    }

    /// `hi < threshold`; false for NaN.
    #[inline]
    pub fn hi_lt(self, threshold: f64) -> bool {
        self.hi < threshold
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.hi > 0.0 || (self.hi == 0.0 && self.lo > 0.0)
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(hi: f64) -> Self {
        Self { hi, lo: 0.0 }
    }
}

impl FromStr for DoubleDouble {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (hi, hi_err) = two_sum(self.hi, rhs.hi);
        let (lo, lo_err) = two_sum(self.lo, rhs.lo);
        let first = Self::renormalized(hi, hi_err + lo);
        Self::renormalized(first.hi, first.lo + lo_err)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.hi, -self.lo)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p, e) = two_prod(self.hi, rhs.hi);
        let cross = self.hi.mul_add(rhs.lo, self.lo * rhs.hi);
        Self::renormalized(p, e + cross)
    }
}

impl Mul<f64> for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, k: f64) -> Self {
        let (p, e) = two_prod(self.hi, k);
        Self::renormalized(p, self.lo.mul_add(k, e))
    }
}

impl PartialEq for DoubleDouble {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

/// Lexicographic on `(hi, lo)`, which matches numeric order for normalized
/// values.
impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi)? {
            Ordering::Equal => self.lo.partial_cmp(&other.lo),
            ord => Some(ord),
        }
    }
}

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e}", self.hi)?;
        if self.lo != 0.0 {
            write!(f, " {:+e}", self.lo)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dd(x: f64) -> DoubleDouble {
        DoubleDouble::from(x)
    }

    /// `|a - b|` measured in double-double.
    fn gap(a: DoubleDouble, b: DoubleDouble) -> f64 {
        (a - b).abs().to_f64()
    }

    // -- Parsing --

    #[test]
    fn literal_tail_survives_parsing() {
        let d: DoubleDouble = "0.1000000000000000000000000001".parse().unwrap();
        assert_eq!(d.hi, 0.1);
        // f64 0.1 overshoots by 5.5511151231257827e-18; the literal adds 1e-28.
        assert!((d.lo - -5.5511151230257827e-18).abs() < 1e-30);
    }

    #[test]
    fn dyadic_and_scientific_literals() {
        assert_eq!(DoubleDouble::from_decimal_str(" -0.5 ").unwrap(), dd(-0.5));
        let small = DoubleDouble::from_decimal_str("1e-7").unwrap();
        assert_eq!(small.hi, 1e-7);
        assert!(small.lo != 0.0 && small.lo.abs() < 1e-23);
    }

    #[test]
    fn malformed_literals_are_rejected() {
        for bad in ["", "-0.7x5", "seahorse"] {
            assert!(DoubleDouble::from_decimal_str(bad).is_err(), "{bad:?} parsed");
        }
    }

    // -- Conversions --

    #[test]
    fn f32_pair_carries_about_48_bits() {
        let d = DoubleDouble::from_decimal_str("-0.74364388703715870475").unwrap();
        let (head, tail) = d.to_f32_pair();
        assert_eq!(head, d.hi as f32);
        assert!(tail.abs() < 1e-7);
        assert!((f64::from(head) + f64::from(tail) - d.to_f64()).abs() < 1e-14);
    }

    #[test]
    fn threshold_check_is_false_for_nan() {
        assert!(dd(1e-8).hi_lt(2e-7));
        assert!(!dd(3.0).hi_lt(2e-7));
        assert!(!dd(f64::NAN).hi_lt(2e-7));
    }

    // -- Arithmetic --

    #[test]
    fn small_addend_is_not_absorbed() {
        let sum = dd(1.0) + dd(1e-17);
        assert_eq!(sum.hi, 1.0);
        assert_eq!(sum.lo, 1e-17);
        assert!(gap(sum - dd(1.0), dd(1e-17)) < 1e-33);
    }

    #[test]
    fn cancellation_exposes_the_tail() {
        let t = 2f64.powi(-70);
        let a = DoubleDouble::new(0.75, 3.0 * t);
        let b = DoubleDouble::new(0.75, -t);
        assert_eq!((a - b).to_f64(), 4.0 * t);
        assert_eq!((a - a).to_f64(), 0.0);
    }

    #[test]
    fn fma_product_keeps_the_hidden_term() {
        // (1 + 2⁻³⁰)(1 − 2⁻³⁰) = 1 − 2⁻⁶⁰; the f64 product alone is 1.0.
        let eps = 2f64.powi(-30);
        let p = dd(1.0 + eps) * dd(1.0 - eps);
        assert_eq!(p.hi, 1.0);
        assert_eq!(p.lo, -(2f64.powi(-60)));

        let plain = (1.0 + eps) * (1.0 - eps);
        assert_eq!(plain, 1.0);
        assert_ne!(p, dd(plain));
    }

    #[test]
    fn cross_terms_reach_the_result() {
        // (3 + 2⁻⁶⁰)·(5 + 2⁻⁶⁰) = 15 + 8·2⁻⁶⁰ + 2⁻¹²⁰
        let t = 2f64.powi(-60);
        let p = DoubleDouble::new(3.0, t) * DoubleDouble::new(5.0, t);
        assert_eq!(p.hi, 15.0);
        assert_eq!(p.lo, 8.0 * t);
    }

    #[test]
    fn scaling_by_a_power_of_two_is_exact() {
        let a = DoubleDouble::from_decimal_str("0.131825904205311970493132056385139").unwrap();
        let doubled = a * 2.0;
        assert_eq!((doubled.hi, doubled.lo), (a.hi * 2.0, a.lo * 2.0));
        assert_eq!(a * 0.25 * 4.0, a);
    }

    #[test]
    fn product_distributes_to_dd_precision() {
        let a = DoubleDouble::from_decimal_str("3.7").unwrap();
        let b = DoubleDouble::from_decimal_str("2.1").unwrap();
        let c = DoubleDouble::from_decimal_str("-4.3").unwrap();
        assert!(gap(a * (b + c), a * b + a * c) < 1e-29);
    }

    // -- Sign and order --

    #[test]
    fn sign_follows_lo_when_hi_is_zero() {
        assert!(DoubleDouble::new(0.0, 1e-300).is_positive());
        assert!(DoubleDouble::new(0.0, -1e-300).is_negative());
        assert!(!DoubleDouble::ZERO.is_positive() && !DoubleDouble::ZERO.is_negative());
        assert_eq!(DoubleDouble::new(-2.0, 1e-17).abs(), DoubleDouble::new(2.0, -1e-17));
    }

    #[test]
    fn order_breaks_ties_on_lo() {
        assert!(DoubleDouble::new(1.0, 1e-17) > dd(1.0));
        assert!(DoubleDouble::new(1.0, -1e-17) < dd(1.0));
        assert!(dd(f64::NAN).partial_cmp(&dd(0.0)).is_none());
    }

    #[test]
    fn display_omits_a_zero_tail() {
        assert_eq!(dd(3.0).to_string(), "3e0");
        assert_eq!(DoubleDouble::new(1.0, 1e-17).to_string(), "1e0 +1e-17");
    }
}
