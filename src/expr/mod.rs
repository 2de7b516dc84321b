//! Boxed expression trees: immutable, context-owned, structurally hashed.

mod canonical;
mod node;

pub use node::{Expr, ExprKind};
