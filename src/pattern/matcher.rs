//! The recursive structural matcher.
//!
//! `match_expr(candidate, pattern, options)` produces a [`Substitution`]
//! or `None`; a failed match is a normal return value, never an error.
//! The matcher always works on structural forms. Backtracking happens in
//! exactly two places: the sequence-wildcard boundary search inside linear
//! operand matching, and the permutation search over commutative operand
//! lists.

use itertools::Itertools;

use crate::context::{Context, DEFAULT_TOLERANCE};
use crate::error::Result;
use crate::expr::{Expr, ExprKind};
use crate::pattern::substitution::Substitution;
use crate::pattern::variant::variants;
use crate::pattern::wildcard::{Wildcard, validate_pattern, wildcard_of};

/// Cap on linear-match attempts spawned by the commutative permutation
/// search, the engine's worst-case exponential cost center.
pub const DEFAULT_PERMUTATION_BUDGET: usize = 10_000;

/// Match configuration. Every knob is independently togglable.
#[derive(Clone, Debug)]
pub struct MatchOptions {
    /// Probe every subexpression of the candidate, not only the root.
    pub recursive: bool,
    /// Disable variant rewriting and numeric tolerance.
    pub exact: bool,
    /// Fuzz window for literal-number equality in relaxed mode.
    pub numeric_tolerance: f64,
    /// Seed bindings to continue a partial match.
    pub substitution: Option<Substitution>,
    /// Disable for callers that already normalized operand order.
    pub match_permutations: bool,
    /// Permutation attempts allowed before the match gives up.
    pub permutation_budget: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            recursive: false,
            exact: false,
            numeric_tolerance: DEFAULT_TOLERANCE,
            substitution: None,
            match_permutations: true,
            permutation_budget: DEFAULT_PERMUTATION_BUDGET,
        }
    }
}

impl MatchOptions {
    /// Exact mode: structural equality only, no variants, no tolerance.
    pub fn strict() -> Self {
        MatchOptions { exact: true, ..MatchOptions::default() }
    }
}

/// A pattern whose wildcard adjacency has been validated. Compiling once
/// at rule-load time keeps malformed patterns out of the match path, so
/// matching itself never raises.
#[derive(Clone, Debug)]
pub struct Pattern {
    expr: Expr,
}

impl Pattern {
    pub fn compile(expr: Expr) -> Result<Pattern> {
        validate_pattern(&expr)?;
        Ok(Pattern { expr })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn matches(&self, candidate: &Expr, options: &MatchOptions) -> Option<Substitution> {
        match_expr(candidate, &self.expr, options)
    }
}

struct MatchState {
    permutations_left: usize,
    budget_warned: bool,
}

impl MatchState {
    fn consume_permutation(&mut self, operator: &str) -> bool {
        if self.permutations_left == 0 {
            if !self.budget_warned {
                log::warn!("permutation budget exhausted while matching {operator} operands");
                self.budget_warned = true;
            }
            return false;
        }
        self.permutations_left -= 1;
        true
    }
}

pub fn match_expr(candidate: &Expr, pattern: &Expr, options: &MatchOptions) -> Option<Substitution> {
    let seed = options.substitution.clone().unwrap_or_default();
    let mut state = MatchState {
        permutations_left: options.permutation_budget,
        budget_warned: false,
    };
    if options.recursive {
        // Preorder probe: the root wins over any of its subexpressions.
        for sub in candidate.subexpressions() {
            if let Some(found) = match_node(&sub, pattern, seed.clone(), options, &mut state, true)
            {
                return Some(found);
            }
        }
        return None;
    }
    match_node(candidate, pattern, seed, options, &mut state, true)
}

fn match_node(
    candidate: &Expr,
    pattern: &Expr,
    subst: Substitution,
    options: &MatchOptions,
    state: &mut MatchState,
    allow_variants: bool,
) -> Option<Substitution> {
    // A wildcard leaf captures the whole candidate, whatever its shape.
    if let Some(wildcard) = wildcard_of(pattern) {
        return capture(candidate.clone(), &wildcard, subst);
    }
    if let Some(found) =
        match_direct(candidate, pattern, subst.clone(), options, state, allow_variants)
    {
        return Some(found);
    }
    if allow_variants && !options.exact {
        // Rewrite the candidate into equivalent longer forms, one level
        // deep only: a variant never matches through its own variants.
        for variant in variants(candidate) {
            log::trace!("variant retry: {candidate} as {variant}");
            if let Some(found) = match_node(&variant, pattern, subst.clone(), options, state, false)
            {
                return Some(found);
            }
        }
    }
    None
}

fn capture(value: Expr, wildcard: &Wildcard, mut subst: Substitution) -> Option<Substitution> {
    match &wildcard.capture {
        None => Some(subst),
        Some(name) => match subst.get(name) {
            // A name bound earlier in this attempt must bind identically.
            Some(bound) => bound.is(&value).then_some(subst),
            None => {
                subst.bind(name.clone(), value);
                Some(subst)
            }
        },
    }
}

fn match_direct(
    candidate: &Expr,
    pattern: &Expr,
    subst: Substitution,
    options: &MatchOptions,
    state: &mut MatchState,
    allow_variants: bool,
) -> Option<Substitution> {
    match (candidate.kind(), pattern.kind()) {
        (ExprKind::Number(c), ExprKind::Number(p)) => {
            let equal = c.eq_exact(p)
                || (!options.exact && c.eq_approx(p, options.numeric_tolerance));
            equal.then_some(subst)
        }
        (ExprKind::Str(c), ExprKind::Str(p)) => (c == p).then_some(subst),
        (ExprKind::Symbol(c), ExprKind::Symbol(p)) => (c == p).then_some(subst),
        (ExprKind::Operator(c_name, c_ops), ExprKind::Operator(p_name, p_ops)) => {
            let ctx = candidate.context().clone();
            let subst = if let Some(wildcard) = Wildcard::classify(p_name) {
                // Wildcard in operator position captures the operator name.
                capture(ctx.symbol(c_name), &wildcard, subst)?
            } else if c_name == p_name {
                subst
            } else {
                return None;
            };
            if options.match_permutations && ctx.is_commutative(c_name) {
                match_ops_commutative(
                    c_ops, p_ops, c_name, &ctx, subst, options, state, allow_variants,
                )
            } else {
                match_ops(c_ops, p_ops, c_name, &ctx, subst, options, state, allow_variants)
            }
        }
        (ExprKind::Dictionary(c_pairs), ExprKind::Dictionary(p_pairs)) => {
            if c_pairs.len() != p_pairs.len() {
                return None;
            }
            let mut subst = subst;
            for (key, p_value) in p_pairs {
                let (_, c_value) = c_pairs.iter().find(|(k, _)| k == key)?;
                subst = match_node(c_value, p_value, subst, options, state, allow_variants)?;
            }
            Some(subst)
        }
        _ => None,
    }
}

/// Left-to-right operand matching. Single wildcards consume one operand;
/// sequence wildcards own the only backtracking outside permutation
/// search.
#[allow(clippy::too_many_arguments)]
fn match_ops(
    cand: &[Expr],
    pat: &[Expr],
    operator: &str,
    ctx: &Context,
    subst: Substitution,
    options: &MatchOptions,
    state: &mut MatchState,
    allow_variants: bool,
) -> Option<Substitution> {
    let Some((p_first, p_rest)) = pat.split_first() else {
        return cand.is_empty().then_some(subst);
    };
    if let Some(wildcard) = wildcard_of(p_first).filter(Wildcard::is_multi) {
        return match_sequence(
            cand, &wildcard, p_rest, operator, ctx, subst, options, state, allow_variants,
        );
    }
    let (c_first, c_rest) = cand.split_first()?;
    let subst = match_node(c_first, p_first, subst, options, state, allow_variants)?;
    match_ops(c_rest, p_rest, operator, ctx, subst, options, state, allow_variants)
}

/// Capture a span of operands under a sequence wildcard. The initial
/// boundary is greedy up to (but excluding) the first operand the next
/// pattern element accepts; on downstream failure the boundary advances by
/// one and the tail is retried. First success wins.
#[allow(clippy::too_many_arguments)]
fn match_sequence(
    cand: &[Expr],
    wildcard: &Wildcard,
    p_rest: &[Expr],
    operator: &str,
    ctx: &Context,
    subst: Substitution,
    options: &MatchOptions,
    state: &mut MatchState,
    allow_variants: bool,
) -> Option<Substitution> {
    let min = wildcard.min_len();
    if cand.len() < min {
        return None;
    }
    let start = match p_rest.first() {
        // A trailing sequence takes everything that is left.
        None => cand.len(),
        Some(next) => (min..cand.len())
            .find(|&i| {
                match_node(&cand[i], next, subst.clone(), options, state, allow_variants).is_some()
            })
            .unwrap_or(min),
    };
    for split in start..=cand.len() {
        let bound = sequence_binding(&cand[..split], operator, ctx);
        let Some(attempt) = capture(bound, wildcard, subst.clone()) else {
            continue;
        };
        if let Some(found) = match_ops(
            &cand[split..], p_rest, operator, ctx, attempt, options, state, allow_variants,
        ) {
            return Some(found);
        }
    }
    None
}

/// What a sequence wildcard binds to: the operator's identity element for
/// an empty span, the bare operand for a singleton, and the span wrapped
/// in the operator (or an explicit `Sequence` marker) otherwise.
fn sequence_binding(span: &[Expr], operator: &str, ctx: &Context) -> Expr {
    match span.len() {
        0 => ctx
            .identity_of(operator)
            .unwrap_or_else(|| ctx.expr("Sequence", Vec::new())),
        1 => span[0].clone(),
        _ => {
            if ctx.identity_of(operator).is_some() {
                ctx.expr(operator, span.to_vec())
            } else {
                ctx.expr("Sequence", span.to_vec())
            }
        }
    }
}

/// Permutation search over the pattern's operand list. Permutations that
/// would place two multi-arity wildcards adjacently are pruned before any
/// work happens; the candidate's operand order is never touched. The
/// budget bounds the exponential worst case.
#[allow(clippy::too_many_arguments)]
fn match_ops_commutative(
    cand: &[Expr],
    pat: &[Expr],
    operator: &str,
    ctx: &Context,
    subst: Substitution,
    options: &MatchOptions,
    state: &mut MatchState,
    allow_variants: bool,
) -> Option<Substitution> {
    for perm in pat.iter().permutations(pat.len()) {
        if has_adjacent_multi(&perm) {
            continue;
        }
        if !state.consume_permutation(operator) {
            return None;
        }
        let ordered: Vec<Expr> = perm.into_iter().cloned().collect();
        if let Some(found) = match_ops(
            cand, &ordered, operator, ctx, subst.clone(), options, state, allow_variants,
        ) {
            return Some(found);
        }
    }
    None
}

fn has_adjacent_multi(ops: &[&Expr]) -> bool {
    let is_multi = |e: &Expr| wildcard_of(e).is_some_and(|w| w.is_multi());
    ops.windows(2).any(|pair| is_multi(pair[0]) && is_multi(pair[1]))
}
