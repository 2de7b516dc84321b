//! Computational core of a computer algebra engine: an immutable boxed
//! expression representation over a unified numeric tower, plus the
//! structural pattern matcher used to test and transform expressions
//! against algebraic rules.
//!
//! Parsing, serialization, rule libraries, and solvers live outside this
//! crate; they produce expressions through [`Context`] boxing and consume
//! the matcher's [`Substitution`] output.

pub mod context;
pub mod error;
pub mod expr;
pub mod num;
pub mod pattern;

pub use context::{Context, DEFAULT_PRECISION, DEFAULT_TOLERANCE, Raw};
pub use error::{CasError, Result};
pub use expr::{Expr, ExprKind};
pub use num::{NumericValue, Sign};
pub use pattern::{
    DEFAULT_PERMUTATION_BUDGET, MatchOptions, Pattern, Substitution, Wildcard, WildcardKind,
    match_expr, validate_pattern,
};
