//! Numeric value representations and canonicalization.
//!
//! Every literal lives in exactly one case of [`NumericValue`]. The
//! canonicalization rule keeps each value in the smallest exact case that
//! loses no information: an integer-valued rational or decimal collapses to
//! a machine integer when it fits, and a complex value with an exactly zero
//! imaginary part collapses to its real part. Machine floats are kept as
//! floats; NaN and the infinities double as the in-band sentinels for
//! numeric-domain conditions, so arithmetic never has to raise.

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Pow, Signed, ToPrimitive, Zero};

pub type Rational = BigRational;
pub type Decimal = BigDecimal;

#[derive(Clone, Debug)]
pub enum NumericValue {
    /// Bounded-magnitude machine integer.
    Int(i64),
    /// Machine float; non-finite values are domain sentinels.
    Float(f64),
    /// Exact big rational, always reduced.
    Rational(Rational),
    /// Arbitrary-precision decimal, rounded to the engine precision by
    /// arithmetic.
    Decimal(Decimal),
    /// Real/imaginary pair; neither part is itself complex.
    Complex(Box<NumericValue>, Box<NumericValue>),
}

/// Sign classification. `Unsigned` is reserved for values with a nonzero
/// imaginary part; NaN has no sign at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Zero,
    Positive,
    Negative,
    Unsigned,
}

impl NumericValue {
    pub fn from_i64(value: i64) -> Self {
        NumericValue::Int(value)
    }

    pub fn from_f64(value: f64) -> Self {
        NumericValue::Float(value)
    }

    pub fn from_bigint(value: BigInt) -> Self {
        int_or_rational(value)
    }

    /// Machine-sized numerator/denominator pair.
    pub fn ratio(numer: i64, denom: i64) -> Self {
        NumericValue::from_ratio(BigInt::from(numer), BigInt::from(denom))
    }

    /// Box a numerator/denominator pair. A zero denominator yields the
    /// division-by-zero sentinel instead of an error.
    pub fn from_ratio(numer: BigInt, denom: BigInt) -> Self {
        if denom.is_zero() {
            return if numer.is_zero() {
                NumericValue::Float(f64::NAN)
            } else if numer.is_positive() {
                NumericValue::Float(f64::INFINITY)
            } else {
                NumericValue::Float(f64::NEG_INFINITY)
            };
        }
        NumericValue::Rational(Rational::new(numer, denom)).canonical()
    }

    pub fn from_decimal_str(text: &str) -> Option<Self> {
        text.parse::<Decimal>()
            .ok()
            .map(|d| NumericValue::Decimal(d).canonical())
    }

    /// Pair a real and an imaginary part. Complex parts are flattened with
    /// `(a+bi) + (c+di)i = (a-d) + (b+c)i` before storing.
    pub fn complex(re: NumericValue, im: NumericValue) -> Self {
        let (ar, ai) = re.split_complex();
        let (br, bi) = im.split_complex();
        let re = crate::num::arith::sub(&ar, &bi, FOLD_PRECISION);
        let im = crate::num::arith::add(&ai, &br, FOLD_PRECISION);
        NumericValue::Complex(Box::new(re), Box::new(im)).canonical()
    }

    /// Collapse to the smallest exact representation. Idempotent.
    pub fn canonical(self) -> NumericValue {
        match self {
            NumericValue::Rational(r) => {
                if r.is_integer() {
                    int_or_rational(r.to_integer())
                } else {
                    NumericValue::Rational(r)
                }
            }
            NumericValue::Decimal(d) => {
                if d.is_integer() {
                    let exact = decimal_to_rational(&d);
                    int_or_rational(exact.to_integer())
                } else {
                    NumericValue::Decimal(d.normalized())
                }
            }
            NumericValue::Complex(re, im) => {
                let re = re.canonical();
                let im = im.canonical();
                if im.is_zero() { re } else { NumericValue::Complex(Box::new(re), Box::new(im)) }
            }
            other => other,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, NumericValue::Complex(_, _))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            NumericValue::Int(i) => *i == 0,
            NumericValue::Float(f) => *f == 0.0,
            NumericValue::Rational(r) => r.is_zero(),
            NumericValue::Decimal(d) => d.is_zero(),
            NumericValue::Complex(re, im) => re.is_zero() && im.is_zero(),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            NumericValue::Float(f) => f.is_finite(),
            NumericValue::Complex(re, im) => re.is_finite() && im.is_finite(),
            _ => true,
        }
    }

    /// The exact rational value, when one exists. `None` for non-finite
    /// sentinels and complex values.
    pub fn to_exact(&self) -> Option<Rational> {
        match self {
            NumericValue::Int(i) => Some(Rational::from_integer(BigInt::from(*i))),
            NumericValue::Float(f) => Rational::from_float(*f),
            NumericValue::Rational(r) => Some(r.clone()),
            NumericValue::Decimal(d) => Some(decimal_to_rational(d)),
            NumericValue::Complex(_, _) => None,
        }
    }

    /// Machine approximation as a `(re, im)` pair.
    pub fn approx(&self) -> (f64, f64) {
        match self {
            NumericValue::Int(i) => (*i as f64, 0.0),
            NumericValue::Float(f) => (*f, 0.0),
            NumericValue::Rational(r) => (r.to_f64().unwrap_or(f64::NAN), 0.0),
            NumericValue::Decimal(d) => (d.to_f64().unwrap_or(f64::NAN), 0.0),
            NumericValue::Complex(re, im) => (re.approx().0, im.approx().0),
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.approx().0
    }

    /// Exact identity across tower cases: machine `1`, rational `1/1`, and
    /// decimal `1.0` are all identical. NaN is identical to NaN here, so a
    /// wildcard bound to a sentinel stays consistent with itself. Distinct
    /// from the tolerance-bounded equality used by relaxed matching.
    pub fn eq_exact(&self, other: &NumericValue) -> bool {
        match (self, other) {
            (NumericValue::Complex(ar, ai), NumericValue::Complex(br, bi)) => {
                ar.eq_exact(br) && ai.eq_exact(bi)
            }
            (NumericValue::Complex(ar, ai), b) => ai.is_zero() && ar.eq_exact(b),
            (a, NumericValue::Complex(br, bi)) => bi.is_zero() && a.eq_exact(br),
            (a, b) => match (a.to_exact(), b.to_exact()) {
                (Some(x), Some(y)) => x == y,
                (None, None) => sentinel_class(a) == sentinel_class(b),
                _ => false,
            },
        }
    }

    /// Tolerance-bounded numeric equality on machine approximations.
    pub fn eq_approx(&self, other: &NumericValue, tolerance: f64) -> bool {
        if self.eq_exact(other) {
            return true;
        }
        let (ar, ai) = self.approx();
        let (br, bi) = other.approx();
        (ar - br).abs() <= tolerance && (ai - bi).abs() <= tolerance
    }

    pub fn sgn(&self) -> Option<Sign> {
        match self {
            NumericValue::Int(i) => Some(sign_of_order(i.cmp(&0))),
            NumericValue::Float(f) => {
                if f.is_nan() {
                    None
                } else {
                    f.partial_cmp(&0.0).map(sign_of_order)
                }
            }
            NumericValue::Rational(r) => Some(sign_of_order(r.cmp(&Rational::zero()))),
            NumericValue::Decimal(d) => Some(sign_of_order(d.cmp(&Decimal::zero()))),
            NumericValue::Complex(re, im) => {
                if im.is_zero() { re.sgn() } else { Some(Sign::Unsigned) }
            }
        }
    }

    /// Total structural order used for canonical operand sorting. Finite
    /// reals order by value; sentinels and complex values fall back to the
    /// hash key so the order stays deterministic.
    pub fn cmp_structural(&self, other: &NumericValue) -> Ordering {
        match (self.to_exact(), other.to_exact()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.hash_key().cmp(&other.hash_key()),
        }
    }

    /// Canonical identity string feeding the structural hash; consistent
    /// with [`NumericValue::eq_exact`].
    pub(crate) fn hash_key(&self) -> String {
        match self {
            NumericValue::Complex(re, im) => format!("{};{}", re.hash_key(), im.hash_key()),
            v => match v.to_exact() {
                Some(r) => r.to_string(),
                None => sentinel_class(v).to_string(),
            },
        }
    }

    fn split_complex(self) -> (NumericValue, NumericValue) {
        match self {
            NumericValue::Complex(re, im) => (*re, *im),
            other => (other, NumericValue::Int(0)),
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Int(i) => write!(f, "{i}"),
            NumericValue::Float(x) => write!(f, "{x}"),
            NumericValue::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            NumericValue::Decimal(d) => write!(f, "{d}"),
            NumericValue::Complex(re, im) => match im.sgn() {
                Some(Sign::Negative) => write!(f, "({re}{im}i)"),
                _ => write!(f, "({re}+{im}i)"),
            },
        }
    }
}

/// Decimal rounding width used when flattening nested complex parts; the
/// engine precision applies everywhere else.
const FOLD_PRECISION: u64 = 34;

fn sign_of_order(order: Ordering) -> Sign {
    match order {
        Ordering::Less => Sign::Negative,
        Ordering::Equal => Sign::Zero,
        Ordering::Greater => Sign::Positive,
    }
}

fn sentinel_class(value: &NumericValue) -> &'static str {
    match value {
        NumericValue::Float(f) if f.is_nan() => "nan",
        NumericValue::Float(f) if *f == f64::INFINITY => "inf",
        NumericValue::Float(f) if *f == f64::NEG_INFINITY => "-inf",
        _ => "finite",
    }
}

/// A big integer stored as the smallest case: `Int` when it fits the
/// machine range, an integer rational otherwise.
pub(crate) fn int_or_rational(value: BigInt) -> NumericValue {
    match value.to_i64() {
        Some(small) => NumericValue::Int(small),
        None => NumericValue::Rational(Rational::from_integer(value)),
    }
}

/// Exact value of a decimal: `mantissa * 10^-scale`.
pub(crate) fn decimal_to_rational(value: &Decimal) -> Rational {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let ten = BigInt::from(10);
    if scale >= 0 {
        Rational::new(mantissa, Pow::pow(&ten, scale as u32))
    } else {
        Rational::from_integer(mantissa * Pow::pow(&ten, (-scale) as u32))
    }
}
