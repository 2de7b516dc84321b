//! Structural pattern matching against boxed expressions.

mod matcher;
mod substitution;
mod variant;
mod wildcard;

pub use matcher::{DEFAULT_PERMUTATION_BUDGET, MatchOptions, Pattern, match_expr};
pub use substitution::Substitution;
pub use wildcard::{Wildcard, WildcardKind, validate_pattern};
