//! Wildcard vocabulary and pattern validation.
//!
//! A symbol whose name starts with `_` is a wildcard: `_x` binds exactly
//! one operand, `__x` binds one or more as a sequence, `___x` binds zero
//! or more. A bare prefix (`_`, `__`, `___`) is anonymous: it matches but
//! captures nothing.

use crate::error::{CasError, Result};
use crate::expr::{Expr, ExprKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WildcardKind {
    /// `_x`: exactly one operand.
    Single,
    /// `__x`: one or more operands.
    Sequence,
    /// `___x`: zero or more operands.
    OptionalSequence,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wildcard {
    pub kind: WildcardKind,
    /// Name captured into the substitution; `None` for anonymous wildcards.
    pub capture: Option<String>,
}

impl Wildcard {
    /// Classify a symbol name by its wildcard prefix. Parsed once at
    /// pattern compile time, not on every match attempt.
    pub fn classify(name: &str) -> Option<Wildcard> {
        let (kind, rest) = if let Some(rest) = name.strip_prefix("___") {
            (WildcardKind::OptionalSequence, rest)
        } else if let Some(rest) = name.strip_prefix("__") {
            (WildcardKind::Sequence, rest)
        } else if let Some(rest) = name.strip_prefix('_') {
            (WildcardKind::Single, rest)
        } else {
            return None;
        };
        let capture = if rest.is_empty() { None } else { Some(rest.to_string()) };
        Some(Wildcard { kind, capture })
    }

    pub fn is_multi(&self) -> bool {
        self.kind != WildcardKind::Single
    }

    pub fn min_len(&self) -> usize {
        match self.kind {
            WildcardKind::OptionalSequence => 0,
            _ => 1,
        }
    }
}

/// The wildcard a symbol leaf denotes, if any.
pub(crate) fn wildcard_of(expr: &Expr) -> Option<Wildcard> {
    Wildcard::classify(expr.symbol()?)
}

fn is_multi_wildcard(expr: &Expr) -> bool {
    wildcard_of(expr).is_some_and(|w| w.is_multi())
}

/// Depth-first, context-free check that no two multi-arity wildcards are
/// adjacent in any operand list. Without an anchor between them the split
/// point would be ambiguous; this is a pattern-authoring bug and fails at
/// load time, never mid-match.
pub fn validate_pattern(pattern: &Expr) -> Result<()> {
    match pattern.kind() {
        ExprKind::Operator(_, ops) => {
            for pair in ops.windows(2) {
                if is_multi_wildcard(&pair[0]) && is_multi_wildcard(&pair[1]) {
                    return Err(CasError::InvalidPattern(format!(
                        "sequence wildcards {} and {} are adjacent; insert a single \
                         wildcard or a concrete operand between them",
                        pair[0], pair[1]
                    )));
                }
            }
            ops.iter().try_for_each(validate_pattern)
        }
        ExprKind::Dictionary(pairs) => pairs.iter().try_for_each(|(_, v)| validate_pattern(v)),
        _ => Ok(()),
    }
}
