//! Rational number type for exact frame rate representation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// A rational number represented as a numerator and denominator.
///
/// Values are always stored in lowest terms with a positive denominator, so
/// two rationals compare equal exactly when they denote the same number.
/// Used for frame rates and the ratios between them, where floating-point
/// rounding would accumulate into visible judder over a long session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    /// Create a new rational number, reduced to lowest terms.
    ///
    /// Returns [`Error::InvalidRate`] if the denominator is zero or the
    /// reduced value does not fit in 64 bits.
    pub fn new(num: i64, den: i64) -> Result<Self> {
        if den == 0 {
            return Err(Error::invalid_rate(format!("{num}/0 has a zero denominator")));
        }
        Self::from_wide(num as i128, den as i128)
            .ok_or_else(|| Error::invalid_rate(format!("{num}/{den} is out of range")))
    }

    /// Create a rational in a constant context.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    pub const fn new_const(num: i64, den: u32) -> Self {
        assert!(den != 0, "Denominator cannot be zero");
        let mut a = num.unsigned_abs();
        let mut b = den as u64;
        while b != 0 {
            let t = b;
            b = a % b;
            a = t;
        }
        Self {
            num: num / a as i64,
            den: den as i64 / a as i64,
        }
    }

    /// Create a rational from an integer.
    pub const fn from_int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Create a zero rational.
    pub const fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    /// Create a rational representing one.
    pub const fn one() -> Self {
        Self { num: 1, den: 1 }
    }

    /// Numerator, in lowest terms.
    pub const fn num(&self) -> i64 {
        self.num
    }

    /// Denominator, in lowest terms and always positive.
    pub const fn den(&self) -> i64 {
        self.den
    }

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Check if this rational is positive.
    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    /// Check if this rational is negative.
    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    /// Largest integer not greater than this value.
    pub fn floor(&self) -> i64 {
        self.num.div_euclid(self.den)
    }

    /// Fractional part, always in `[0, 1)`.
    pub fn fract(&self) -> Self {
        Self {
            num: self.num.rem_euclid(self.den),
            den: self.den,
        }
    }

    /// Convert to f64.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Convert to f32.
    pub fn to_f32(&self) -> f32 {
        self.num as f32 / self.den as f32
    }

    /// Express this value in units of `1 / timescale`, rounded to nearest.
    ///
    /// For APIs that describe rates or durations as a value/timescale pair.
    /// Saturates at the `i64` range.
    pub fn to_timescale(&self, timescale: i64) -> i64 {
        let scaled = self.num as i128 * timescale as i128;
        let den = self.den as i128;
        let mut value = scaled.div_euclid(den);
        if 2 * scaled.rem_euclid(den) >= den {
            value += 1;
        }
        i64::try_from(value).unwrap_or(if value > 0 { i64::MAX } else { i64::MIN })
    }

    /// Get the reciprocal of this rational.
    ///
    /// Returns [`Error::InvalidRate`] if the value is zero.
    pub fn recip(&self) -> Result<Self> {
        Self::new(self.den, self.num)
    }

    /// Multiply by an integer.
    ///
    /// # Panics
    ///
    /// Panics if the result overflows.
    pub fn mul_int(&self, n: i64) -> Self {
        *self * Self::from_int(n)
    }

    /// Checked addition. Returns `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let num = self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128;
        Self::from_wide(num, self.den as i128 * rhs.den as i128)
    }

    /// Checked subtraction. Returns `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let num = self.num as i128 * rhs.den as i128 - rhs.num as i128 * self.den as i128;
        Self::from_wide(num, self.den as i128 * rhs.den as i128)
    }

    /// Checked multiplication. Returns `None` on overflow.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        Self::from_wide(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        )
    }

    /// Exact division.
    ///
    /// Returns [`Error::InvalidRate`] when dividing by zero or when the
    /// quotient does not fit in 64 bits.
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            return Err(Error::invalid_rate(format!("division of {self} by zero")));
        }
        Self::from_wide(
            self.num as i128 * rhs.den as i128,
            self.den as i128 * rhs.num as i128,
        )
        .ok_or_else(|| Error::invalid_rate(format!("{self} / {rhs} is out of range")))
    }

    /// Reduce a wide fraction and narrow it back to 64 bits.
    fn from_wide(num: i128, den: i128) -> Option<Self> {
        debug_assert!(den != 0);
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        if num == 0 {
            return Some(Self::zero());
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        Some(Self {
            num: i64::try_from(num / g).ok()?,
            den: i64::try_from(den / g).ok()?,
        })
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("attempt to add {self} and {rhs} with overflow"),
        }
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        match self.checked_sub(rhs) {
            Some(diff) => diff,
            None => panic!("attempt to subtract {rhs} from {self} with overflow"),
        }
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.checked_mul(rhs) {
            Some(product) => product,
            None => panic!("attempt to multiply {self} by {rhs} with overflow"),
        }
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_int(n as i64)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl TryFrom<(i64, i64)> for Rational {
    type Error = Error;

    fn try_from((num, den): (i64, i64)) -> Result<Self> {
        Self::new(num, den)
    }
}

impl From<Rational> for (i64, i64) {
    fn from(r: Rational) -> Self {
        (r.num, r.den)
    }
}

impl FromStr for Rational {
    type Err = Error;

    /// Parse `"30000/1001"` or a plain integer such as `"25"`.
    fn from_str(s: &str) -> Result<Self> {
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|e| Error::invalid_rate(format!("{s:?}: {e}")))
        };
        match s.split_once('/') {
            Some((num, den)) => Self::new(parse(num)?, parse(den)?),
            None => Ok(Self::from_int(parse(s)?)),
        }
    }
}

/// Calculate the greatest common divisor using Euclidean algorithm.
fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
