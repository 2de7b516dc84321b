//! The unified numeric tower behind expression literals.

mod arith;
mod value;

pub use arith::{abs, add, div, ln, mul, neg, pow, sqrt, sub};
pub use value::{Decimal, NumericValue, Rational, Sign};
