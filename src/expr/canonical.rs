//! Canonical form: the normalized derivative of a structural expression.
//!
//! Canonicalization folds numeric constants through the tower, drops
//! algebraic identity elements, and sorts commutative operand lists by the
//! structural total order. It is idempotent and never touches the
//! structural form it was derived from; the pattern matcher keeps working
//! on structural forms.

use crate::expr::node::{Expr, ExprKind};
use crate::num::{self, NumericValue};

impl Expr {
    pub fn to_canonical(&self) -> Expr {
        if self.is_canonical() {
            return self.clone();
        }
        let ctx = self.context().clone();
        match self.kind() {
            ExprKind::Number(value) => {
                Expr::new(ctx, ExprKind::Number(value.clone().canonical()), true)
            }
            ExprKind::Symbol(_) | ExprKind::Str(_) => {
                Expr::new(ctx, self.kind().clone(), true)
            }
            ExprKind::Operator(name, ops) => {
                let mut ops: Vec<Expr> = ops.iter().map(Expr::to_canonical).collect();
                if ctx.is_commutative(name) {
                    if let Some(folded) = fold_constants(name, &ops, &ctx) {
                        ops = folded;
                    }
                    ops.sort_by(Expr::cmp_structural);
                    match ops.len() {
                        0 => {
                            if let Some(identity) = ctx.identity_of(name) {
                                return identity.to_canonical();
                            }
                        }
                        1 if ctx.identity_of(name).is_some() => {
                            // Associative operator over a single operand.
                            return ops.remove(0);
                        }
                        _ => {}
                    }
                }
                Expr::new(ctx, ExprKind::Operator(name.clone(), ops), true)
            }
            ExprKind::Dictionary(pairs) => {
                let mut pairs: Vec<(String, Expr)> = pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_canonical()))
                    .collect();
                pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
                Expr::new(ctx, ExprKind::Dictionary(pairs), true)
            }
        }
    }
}

/// Fold the numeric operands of a sum or product into one constant,
/// dropping it when it is the operator's identity and other operands
/// remain.
fn fold_constants(
    operator: &str,
    ops: &[Expr],
    ctx: &crate::context::Context,
) -> Option<Vec<Expr>> {
    let fold: fn(&NumericValue, &NumericValue, u64) -> NumericValue = match operator {
        "Add" => num::add,
        "Multiply" => num::mul,
        _ => return None,
    };
    let (numbers, rest): (Vec<&Expr>, Vec<&Expr>) =
        ops.iter().partition(|e| e.numeric_value().is_some());
    if numbers.len() < 2 && !(numbers.len() == 1 && !rest.is_empty()) {
        return None;
    }
    let precision = ctx.precision();
    let mut constant = numbers[0].numeric_value()?.clone();
    for number in &numbers[1..] {
        constant = fold(&constant, number.numeric_value()?, precision);
    }
    let identity = ctx
        .identity_of(operator)
        .and_then(|e| e.numeric_value().cloned());
    let mut out = Vec::with_capacity(rest.len() + 1);
    let is_identity = identity.is_some_and(|id| id.eq_exact(&constant));
    if !is_identity || rest.is_empty() {
        out.push(ctx.number(constant));
    }
    out.extend(rest.into_iter().cloned());
    Some(out)
}
