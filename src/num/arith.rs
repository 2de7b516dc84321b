//! Total arithmetic over the numeric tower.
//!
//! Every binary operation funnels through [`promote`], the single promotion
//! table: machine values lift into the exact side, exact rationals meet
//! decimals at the configured precision, and complex values absorb
//! everything else. Division by zero and indeterminate forms come back as
//! float sentinels, never as errors, so chains of operations need no
//! per-step handling. Results renormalize to the smallest exact case.

use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::num::value::{
    Decimal, NumericValue, Rational, Sign, decimal_to_rational, int_or_rational,
};

/// A pair of operands lifted to their common tower case.
enum Promoted {
    Int(i64, i64),
    Float(f64, f64),
    Rational(Rational, Rational),
    Decimal(Decimal, Decimal),
    Complex((NumericValue, NumericValue), (NumericValue, NumericValue)),
}

fn promote(a: &NumericValue, b: &NumericValue, precision: u64) -> Promoted {
    use NumericValue as N;
    if a.is_complex() || b.is_complex() {
        return Promoted::Complex(complex_parts(a), complex_parts(b));
    }
    // Non-finite sentinels contaminate: fall through to IEEE semantics.
    if !a.is_finite() || !b.is_finite() {
        return Promoted::Float(a.to_f64(), b.to_f64());
    }
    match (a, b) {
        (N::Decimal(_), _) | (_, N::Decimal(_)) => {
            Promoted::Decimal(to_decimal(a, precision), to_decimal(b, precision))
        }
        (N::Rational(_), _) | (_, N::Rational(_)) => {
            Promoted::Rational(to_rational(a), to_rational(b))
        }
        (N::Float(_), _) | (_, N::Float(_)) => Promoted::Float(a.to_f64(), b.to_f64()),
        (N::Int(x), N::Int(y)) => Promoted::Int(*x, *y),
        _ => unreachable!("complex handled above"),
    }
}

fn complex_parts(value: &NumericValue) -> (NumericValue, NumericValue) {
    match value {
        NumericValue::Complex(re, im) => ((**re).clone(), (**im).clone()),
        other => (other.clone(), NumericValue::Int(0)),
    }
}

fn to_rational(value: &NumericValue) -> Rational {
    value.to_exact().unwrap_or_else(Rational::zero)
}

fn to_decimal(value: &NumericValue, precision: u64) -> Decimal {
    match value {
        NumericValue::Int(i) => Decimal::from(*i),
        NumericValue::Decimal(d) => d.clone(),
        NumericValue::Float(f) => Decimal::try_from(*f).unwrap_or_else(|_| Decimal::zero()),
        NumericValue::Rational(r) => rational_to_decimal(r, precision),
        NumericValue::Complex(_, _) => Decimal::zero(),
    }
}

fn rational_to_decimal(value: &Rational, precision: u64) -> Decimal {
    let numer = Decimal::from(value.numer().clone());
    let denom = Decimal::from(value.denom().clone());
    (numer / denom).with_prec(precision)
}

pub fn add(a: &NumericValue, b: &NumericValue, precision: u64) -> NumericValue {
    match promote(a, b, precision) {
        Promoted::Int(x, y) => match x.checked_add(y) {
            Some(sum) => NumericValue::Int(sum),
            None => int_or_rational(BigInt::from(x) + BigInt::from(y)),
        },
        Promoted::Float(x, y) => NumericValue::Float(x + y),
        Promoted::Rational(x, y) => NumericValue::Rational(x + y).canonical(),
        Promoted::Decimal(x, y) => NumericValue::Decimal((x + y).with_prec(precision)).canonical(),
        Promoted::Complex((ar, ai), (br, bi)) => NumericValue::Complex(
            Box::new(add(&ar, &br, precision)),
            Box::new(add(&ai, &bi, precision)),
        )
        .canonical(),
    }
}

pub fn sub(a: &NumericValue, b: &NumericValue, precision: u64) -> NumericValue {
    add(a, &neg(b), precision)
}

pub fn mul(a: &NumericValue, b: &NumericValue, precision: u64) -> NumericValue {
    match promote(a, b, precision) {
        Promoted::Int(x, y) => match x.checked_mul(y) {
            Some(product) => NumericValue::Int(product),
            None => int_or_rational(BigInt::from(x) * BigInt::from(y)),
        },
        Promoted::Float(x, y) => NumericValue::Float(x * y),
        Promoted::Rational(x, y) => NumericValue::Rational(x * y).canonical(),
        Promoted::Decimal(x, y) => NumericValue::Decimal((x * y).with_prec(precision)).canonical(),
        Promoted::Complex((ar, ai), (br, bi)) => {
            let re = sub(&mul(&ar, &br, precision), &mul(&ai, &bi, precision), precision);
            let im = add(&mul(&ar, &bi, precision), &mul(&ai, &br, precision), precision);
            NumericValue::Complex(Box::new(re), Box::new(im)).canonical()
        }
    }
}

pub fn div(a: &NumericValue, b: &NumericValue, precision: u64) -> NumericValue {
    match promote(a, b, precision) {
        Promoted::Int(x, y) => {
            if y == 0 {
                zero_division_sentinel(a)
            } else {
                NumericValue::Rational(Rational::new(BigInt::from(x), BigInt::from(y))).canonical()
            }
        }
        Promoted::Float(x, y) => NumericValue::Float(x / y),
        Promoted::Rational(x, y) => {
            if y.is_zero() {
                zero_division_sentinel(a)
            } else {
                NumericValue::Rational(x / y).canonical()
            }
        }
        Promoted::Decimal(x, y) => {
            if y.is_zero() {
                zero_division_sentinel(a)
            } else {
                NumericValue::Decimal((x / y).with_prec(precision)).canonical()
            }
        }
        Promoted::Complex((ar, ai), (br, bi)) => {
            let norm = add(&mul(&br, &br, precision), &mul(&bi, &bi, precision), precision);
            if norm.is_zero() {
                return NumericValue::Float(f64::NAN);
            }
            let re = add(&mul(&ar, &br, precision), &mul(&ai, &bi, precision), precision);
            let im = sub(&mul(&ai, &br, precision), &mul(&ar, &bi, precision), precision);
            NumericValue::Complex(
                Box::new(div(&re, &norm, precision)),
                Box::new(div(&im, &norm, precision)),
            )
            .canonical()
        }
    }
}

pub fn neg(a: &NumericValue) -> NumericValue {
    match a {
        NumericValue::Int(i) => match i.checked_neg() {
            Some(n) => NumericValue::Int(n),
            None => int_or_rational(-BigInt::from(*i)),
        },
        NumericValue::Float(f) => NumericValue::Float(-f),
        NumericValue::Rational(r) => NumericValue::Rational(-r.clone()),
        NumericValue::Decimal(d) => NumericValue::Decimal(-d.clone()),
        NumericValue::Complex(re, im) => {
            NumericValue::Complex(Box::new(neg(re)), Box::new(neg(im)))
        }
    }
}

pub fn abs(a: &NumericValue) -> NumericValue {
    match a {
        NumericValue::Int(i) => match i.checked_abs() {
            Some(n) => NumericValue::Int(n),
            None => int_or_rational(BigInt::from(*i).abs()),
        },
        NumericValue::Float(f) => NumericValue::Float(f.abs()),
        NumericValue::Rational(r) => NumericValue::Rational(r.abs()),
        NumericValue::Decimal(d) => NumericValue::Decimal(d.abs()),
        NumericValue::Complex(re, im) => {
            NumericValue::Float(re.to_f64().hypot(im.to_f64()))
        }
    }
}

pub fn pow(a: &NumericValue, b: &NumericValue, precision: u64) -> NumericValue {
    if let Some(exponent) = small_int_exponent(b) {
        return pow_int(a, exponent, precision);
    }
    if a.is_complex() || b.is_complex() {
        // z^w = exp(w ln z), evaluated at machine precision.
        return exp_machine(&mul(b, &ln(a), precision));
    }
    let base = a.to_f64();
    let exp = b.to_f64();
    if base < 0.0 && exp.is_finite() {
        // Principal value through the polar form.
        let radius = base.abs().powf(exp);
        let angle = std::f64::consts::PI * exp;
        return NumericValue::Complex(
            Box::new(NumericValue::Float(radius * angle.cos())),
            Box::new(NumericValue::Float(radius * angle.sin())),
        )
        .canonical();
    }
    NumericValue::Float(base.powf(exp))
}

/// Exact square root where one exists (perfect squares of integers and
/// rationals, decimal roots at precision); machine or complex otherwise.
pub fn sqrt(a: &NumericValue, precision: u64) -> NumericValue {
    match a {
        NumericValue::Int(i) => {
            if *i < 0 {
                return imaginary_sqrt(&neg(a), precision);
            }
            let root = BigInt::from(*i).sqrt();
            if &root * &root == BigInt::from(*i) {
                int_or_rational(root)
            } else {
                NumericValue::Float((*i as f64).sqrt())
            }
        }
        NumericValue::Float(f) => {
            if *f < 0.0 {
                imaginary_sqrt(&NumericValue::Float(-f), precision)
            } else {
                NumericValue::Float(f.sqrt())
            }
        }
        NumericValue::Rational(r) => {
            if r.is_negative() {
                return imaginary_sqrt(&NumericValue::Rational(-r.clone()), precision);
            }
            let numer_root = r.numer().sqrt();
            let denom_root = r.denom().sqrt();
            if &numer_root * &numer_root == *r.numer() && &denom_root * &denom_root == *r.denom() {
                NumericValue::Rational(Rational::new(numer_root, denom_root)).canonical()
            } else {
                NumericValue::Float(r.to_f64().unwrap_or(f64::NAN).sqrt())
            }
        }
        NumericValue::Decimal(d) => {
            if d.is_negative() {
                return imaginary_sqrt(&NumericValue::Decimal(d.abs()), precision);
            }
            match d.sqrt() {
                Some(root) => NumericValue::Decimal(root.with_prec(precision)).canonical(),
                None => NumericValue::Float(f64::NAN),
            }
        }
        NumericValue::Complex(re, im) => {
            let (x, y) = (re.to_f64(), im.to_f64());
            let radius = x.hypot(y);
            let root_re = ((radius + x) / 2.0).sqrt();
            let root_im = ((radius - x) / 2.0).sqrt() * y.signum();
            NumericValue::Complex(
                Box::new(NumericValue::Float(root_re)),
                Box::new(NumericValue::Float(root_im)),
            )
            .canonical()
        }
    }
}

/// Natural logarithm; `ln 1` stays exact, negative reals and complex
/// arguments take the principal branch.
pub fn ln(a: &NumericValue) -> NumericValue {
    if let NumericValue::Complex(re, im) = a {
        let (x, y) = (re.to_f64(), im.to_f64());
        return NumericValue::Complex(
            Box::new(NumericValue::Float(x.hypot(y).ln())),
            Box::new(NumericValue::Float(y.atan2(x))),
        )
        .canonical();
    }
    match a.sgn() {
        None => NumericValue::Float(f64::NAN),
        Some(Sign::Zero) => NumericValue::Float(f64::NEG_INFINITY),
        Some(Sign::Negative) => NumericValue::Complex(
            Box::new(NumericValue::Float(a.to_f64().abs().ln())),
            Box::new(NumericValue::Float(std::f64::consts::PI)),
        ),
        Some(_) => {
            if a.to_exact().is_some_and(|r| r.is_one()) {
                NumericValue::Int(0)
            } else {
                NumericValue::Float(a.to_f64().ln())
            }
        }
    }
}

fn exp_machine(a: &NumericValue) -> NumericValue {
    match a {
        NumericValue::Complex(re, im) => {
            let (x, y) = (re.to_f64(), im.to_f64());
            let scale = x.exp();
            NumericValue::Complex(
                Box::new(NumericValue::Float(scale * y.cos())),
                Box::new(NumericValue::Float(scale * y.sin())),
            )
            .canonical()
        }
        other => NumericValue::Float(other.to_f64().exp()),
    }
}

fn imaginary_sqrt(magnitude: &NumericValue, precision: u64) -> NumericValue {
    NumericValue::Complex(
        Box::new(NumericValue::Int(0)),
        Box::new(sqrt(magnitude, precision)),
    )
    .canonical()
}

/// Integer exponents small enough for exact dispatch.
fn small_int_exponent(b: &NumericValue) -> Option<i32> {
    let exact = b.to_exact()?;
    if exact.is_integer() { exact.to_integer().to_i32() } else { None }
}

fn pow_int(a: &NumericValue, exponent: i32, precision: u64) -> NumericValue {
    if exponent == 0 {
        return NumericValue::Int(1);
    }
    match a {
        NumericValue::Int(x) => {
            if *x == 0 && exponent < 0 {
                return zero_division_sentinel(&NumericValue::Int(1));
            }
            NumericValue::Rational(Rational::from_integer(BigInt::from(*x)).pow(exponent))
                .canonical()
        }
        NumericValue::Float(f) => NumericValue::Float(f.powi(exponent)),
        NumericValue::Rational(r) => {
            if r.is_zero() && exponent < 0 {
                return zero_division_sentinel(&NumericValue::Int(1));
            }
            NumericValue::Rational(r.pow(exponent)).canonical()
        }
        NumericValue::Decimal(d) => {
            if d.is_zero() && exponent < 0 {
                return zero_division_sentinel(&NumericValue::Int(1));
            }
            let exact = decimal_to_rational(d).pow(exponent);
            NumericValue::Decimal(rational_to_decimal(&exact, precision)).canonical()
        }
        NumericValue::Complex(_, _) => {
            if exponent < 0 {
                let positive = pow_int(a, -exponent, precision);
                return div(&NumericValue::Int(1), &positive, precision);
            }
            // Exponentiation by squaring keeps exact parts exact.
            let mut result = NumericValue::Int(1);
            let mut base = a.clone();
            let mut remaining = exponent as u32;
            while remaining > 0 {
                if remaining & 1 == 1 {
                    result = mul(&result, &base, precision);
                }
                base = mul(&base, &base, precision);
                remaining >>= 1;
            }
            result
        }
    }
}

fn zero_division_sentinel(numerator: &NumericValue) -> NumericValue {
    match numerator.sgn() {
        Some(Sign::Positive) => NumericValue::Float(f64::INFINITY),
        Some(Sign::Negative) => NumericValue::Float(f64::NEG_INFINITY),
        _ => NumericValue::Float(f64::NAN),
    }
}
