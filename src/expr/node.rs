//! The boxed expression node.
//!
//! An [`Expr`] is a cheap handle over an immutable node produced by the
//! owning [`Context`]. Exactly one variant is active at a time; every node
//! carries its context (shared, never owned), a lazily computed structural
//! hash used for fast-path rejection, and a flag recording whether the node
//! is the canonical form of itself.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::context::Context;
use crate::num::{NumericValue, Sign};

#[derive(Clone)]
pub struct Expr {
    node: Rc<Node>,
}

pub(crate) struct Node {
    ctx: Context,
    kind: ExprKind,
    canonical: bool,
    hash: OnceCell<u64>,
}

#[derive(Clone)]
pub enum ExprKind {
    Number(NumericValue),
    Symbol(String),
    Str(String),
    Operator(String, Vec<Expr>),
    Dictionary(Vec<(String, Expr)>),
}

impl Expr {
    pub(crate) fn new(ctx: Context, kind: ExprKind, canonical: bool) -> Self {
        Expr {
            node: Rc::new(Node { ctx, kind, canonical, hash: OnceCell::new() }),
        }
    }

    pub fn context(&self) -> &Context {
        &self.node.ctx
    }

    pub fn kind(&self) -> &ExprKind {
        &self.node.kind
    }

    pub fn is_canonical(&self) -> bool {
        self.node.canonical
    }

    pub fn operator(&self) -> Option<&str> {
        match self.kind() {
            ExprKind::Operator(name, _) => Some(name),
            _ => None,
        }
    }

    pub fn ops(&self) -> Option<&[Expr]> {
        match self.kind() {
            ExprKind::Operator(_, ops) => Some(ops),
            _ => None,
        }
    }

    pub fn numeric_value(&self) -> Option<&NumericValue> {
        match self.kind() {
            ExprKind::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self.kind() {
            ExprKind::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&str> {
        match self.kind() {
            ExprKind::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn dictionary(&self) -> Option<&[(String, Expr)]> {
        match self.kind() {
            ExprKind::Dictionary(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Resolve a free symbol through the context bindings. Binding a symbol
    /// later never changes the identity of the node itself.
    pub fn value(&self) -> Expr {
        match self.kind() {
            ExprKind::Symbol(name) => self.context().binding(name).unwrap_or_else(|| self.clone()),
            _ => self.clone(),
        }
    }

    pub fn sgn(&self) -> Option<Sign> {
        self.value().numeric_value().and_then(NumericValue::sgn)
    }

    /// Whether `name` occurs as a symbol or operator anywhere in the tree.
    pub fn has(&self, name: &str) -> bool {
        match self.kind() {
            ExprKind::Symbol(s) => s == name,
            ExprKind::Str(_) | ExprKind::Number(_) => false,
            ExprKind::Operator(op, ops) => op == name || ops.iter().any(|e| e.has(name)),
            ExprKind::Dictionary(pairs) => pairs.iter().any(|(_, v)| v.has(name)),
        }
    }

    /// Exact structural identity. Numbers compare with the tower's exact
    /// identity, so machine `1` is `1/1` regardless of the stored case. The
    /// cached hash only gates the full comparison; collisions fall through
    /// to it.
    pub fn is(&self, other: &Expr) -> bool {
        if Rc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        if self.structural_hash() != other.structural_hash() {
            return false;
        }
        match (self.kind(), other.kind()) {
            (ExprKind::Number(a), ExprKind::Number(b)) => a.eq_exact(b),
            (ExprKind::Symbol(a), ExprKind::Symbol(b)) => a == b,
            (ExprKind::Str(a), ExprKind::Str(b)) => a == b,
            (ExprKind::Operator(a, xs), ExprKind::Operator(b, ys)) => {
                a == b && xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.is(y))
            }
            (ExprKind::Dictionary(xs), ExprKind::Dictionary(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.is(vb))
            }
            _ => false,
        }
    }

    pub fn structural_hash(&self) -> u64 {
        *self.node.hash.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            hash_kind(&self.node.kind, &mut hasher);
            hasher.finish()
        })
    }

    /// Total order over structural forms: numbers sort before symbols,
    /// symbols before strings, then operator expressions, then
    /// dictionaries. Drives canonical operand sorting.
    pub fn cmp_structural(&self, other: &Expr) -> Ordering {
        fn rank(kind: &ExprKind) -> u8 {
            match kind {
                ExprKind::Number(_) => 0,
                ExprKind::Symbol(_) => 1,
                ExprKind::Str(_) => 2,
                ExprKind::Operator(_, _) => 3,
                ExprKind::Dictionary(_) => 4,
            }
        }
        match (self.kind(), other.kind()) {
            (ExprKind::Number(a), ExprKind::Number(b)) => a.cmp_structural(b),
            (ExprKind::Symbol(a), ExprKind::Symbol(b)) => a.cmp(b),
            (ExprKind::Str(a), ExprKind::Str(b)) => a.cmp(b),
            (ExprKind::Operator(a, xs), ExprKind::Operator(b, ys)) => a
                .cmp(b)
                .then_with(|| xs.len().cmp(&ys.len()))
                .then_with(|| {
                    xs.iter()
                        .zip(ys)
                        .map(|(x, y)| x.cmp_structural(y))
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                }),
            (ExprKind::Dictionary(xs), ExprKind::Dictionary(ys)) => xs
                .len()
                .cmp(&ys.len())
                .then_with(|| {
                    xs.iter()
                        .zip(ys)
                        .map(|((ka, va), (kb, vb))| {
                            ka.cmp(kb).then_with(|| va.cmp_structural(vb))
                        })
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                }),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }

    /// Preorder traversal, root first.
    pub fn subexpressions(&self) -> Vec<Expr> {
        let mut out = Vec::new();
        collect_preorder(self, &mut out);
        out
    }
}

fn collect_preorder(expr: &Expr, out: &mut Vec<Expr>) {
    out.push(expr.clone());
    match expr.kind() {
        ExprKind::Operator(_, ops) => {
            for op in ops {
                collect_preorder(op, out);
            }
        }
        ExprKind::Dictionary(pairs) => {
            for (_, value) in pairs {
                collect_preorder(value, out);
            }
        }
        _ => {}
    }
}

fn hash_kind(kind: &ExprKind, hasher: &mut DefaultHasher) {
    match kind {
        ExprKind::Number(value) => {
            hasher.write_u8(0);
            value.hash_key().hash(hasher);
        }
        ExprKind::Symbol(name) => {
            hasher.write_u8(1);
            name.hash(hasher);
        }
        ExprKind::Str(text) => {
            hasher.write_u8(2);
            text.hash(hasher);
        }
        ExprKind::Operator(name, ops) => {
            hasher.write_u8(3);
            name.hash(hasher);
            hasher.write_usize(ops.len());
            for op in ops {
                hasher.write_u64(op.structural_hash());
            }
        }
        ExprKind::Dictionary(pairs) => {
            hasher.write_u8(4);
            hasher.write_usize(pairs.len());
            for (key, value) in pairs {
                key.hash(hasher);
                hasher.write_u64(value.structural_hash());
            }
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Number(value) => write!(f, "{value}"),
            ExprKind::Symbol(name) => write!(f, "{name}"),
            ExprKind::Str(text) => write!(f, "\"{text}\""),
            ExprKind::Operator(name, ops) => {
                write!(f, "({name}")?;
                for op in ops {
                    write!(f, " {op}")?;
                }
                write!(f, ")")
            }
            ExprKind::Dictionary(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
