//! Variant rewriting: a fixed table of canonical identities used to grow a
//! candidate into an equivalent longer form when a direct structural match
//! fails. Applied one level deep per attempt and never to its own output,
//! so the retry always terminates. A pattern written as `a + b` can match
//! a bare `x` through `x = 0 + x` without the rule author enumerating
//! every degenerate shape.

use crate::expr::{Expr, ExprKind};

pub(crate) fn variants(candidate: &Expr) -> Vec<Expr> {
    let ctx = candidate.context().clone();
    let mut out = Vec::new();
    if let ExprKind::Operator(name, ops) = candidate.kind() {
        match (name.as_str(), ops.as_slice()) {
            ("Subtract", [a, b]) => {
                out.push(ctx.expr(
                    "Add",
                    vec![a.clone(), ctx.expr("Negate", vec![b.clone()])],
                ));
            }
            ("Negate", [x]) => {
                out.push(ctx.expr("Multiply", vec![ctx.int(-1), x.clone()]));
            }
            ("Divide", [a, b]) => {
                out.push(ctx.expr(
                    "Multiply",
                    vec![a.clone(), ctx.expr("Power", vec![b.clone(), ctx.int(-1)])],
                ));
            }
            ("Power", [x, e]) => {
                if e.numeric_value().is_some_and(|n| n.eq_exact(&crate::num::NumericValue::Int(2))) {
                    out.push(ctx.expr("Square", vec![x.clone()]));
                }
                if x.symbol() == Some("ExponentialE") {
                    out.push(ctx.expr("Exp", vec![e.clone()]));
                }
            }
            ("Square", [x]) => {
                out.push(ctx.expr("Power", vec![x.clone(), ctx.int(2)]));
            }
            ("Exp", [x]) => {
                out.push(ctx.expr("Power", vec![ctx.symbol("ExponentialE"), x.clone()]));
            }
            _ => {}
        }
    }
    // Degenerate sum/product forms apply to any candidate.
    if candidate.operator() != Some("Add") {
        out.push(ctx.expr("Add", vec![ctx.int(0), candidate.clone()]));
    }
    if candidate.operator() != Some("Multiply") {
        out.push(ctx.expr("Multiply", vec![ctx.int(1), candidate.clone()]));
    }
    out
}
