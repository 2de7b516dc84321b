//! The engine context: configuration, symbol bindings, interning, and the
//! engine-mediated boxing entry points.
//!
//! All expression nodes are produced here. The context is shared (cheap
//! clones of one `Rc`), and it is the only mutable state in the core;
//! nodes themselves are immutable once boxed.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use num_bigint::BigInt;

use crate::error::{CasError, Result};
use crate::expr::{Expr, ExprKind};
use crate::num::NumericValue;

/// Default working precision for arbitrary-precision decimals, in digits.
pub const DEFAULT_PRECISION: u64 = 21;
/// Default fuzz window for tolerance-bounded numeric equality.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Small integers are interned so the usual constants share one node.
const INTERN_RANGE: std::ops::RangeInclusive<i64> = -2..=256;

/// Raw input accepted by the boxing entry points. This is what an external
/// parser or deserializer hands the engine.
#[derive(Clone, Debug)]
pub enum Raw {
    Int(i64),
    Float(f64),
    BigInt(BigInt),
    /// Numerator/denominator pair; a zero denominator boxes the
    /// division-by-zero sentinel.
    Ratio(i64, i64),
    /// Decimal literal text, e.g. `"1.23456789012345678901234567890"`.
    Decimal(String),
    Symbol(String),
    Str(String),
    Operator(String, Vec<Raw>),
    Dictionary(Vec<(Raw, Raw)>),
}

#[derive(Clone)]
pub struct Context {
    inner: Rc<Inner>,
}

struct Inner {
    precision: Cell<u64>,
    tolerance: Cell<f64>,
    commutative: RefCell<HashSet<String>>,
    identities: RefCell<HashMap<String, i64>>,
    bindings: RefCell<HashMap<String, Expr>>,
    interned: RefCell<HashMap<i64, Expr>>,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Self {
        let commutative = ["Add", "Multiply"].iter().map(|s| s.to_string()).collect();
        let identities = [("Add".to_string(), 0), ("Multiply".to_string(), 1)]
            .into_iter()
            .collect();
        Context {
            inner: Rc::new(Inner {
                precision: Cell::new(DEFAULT_PRECISION),
                tolerance: Cell::new(DEFAULT_TOLERANCE),
                commutative: RefCell::new(commutative),
                identities: RefCell::new(identities),
                bindings: RefCell::new(HashMap::new()),
                interned: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn precision(&self) -> u64 {
        self.inner.precision.get()
    }

    pub fn set_precision(&self, digits: u64) {
        self.inner.precision.set(digits.max(1));
    }

    pub fn tolerance(&self) -> f64 {
        self.inner.tolerance.get()
    }

    pub fn set_tolerance(&self, tolerance: f64) {
        self.inner.tolerance.set(tolerance.max(0.0));
    }

    pub fn is_commutative(&self, operator: &str) -> bool {
        self.inner.commutative.borrow().contains(operator)
    }

    /// Declare an operator commutative, optionally with an identity element
    /// used for zero-length sequence captures and canonical folding.
    pub fn declare_commutative(&self, operator: &str, identity: Option<i64>) {
        self.inner.commutative.borrow_mut().insert(operator.to_string());
        if let Some(id) = identity {
            self.inner.identities.borrow_mut().insert(operator.to_string(), id);
        }
    }

    /// The operator's algebraic identity element, when one is known.
    pub fn identity_of(&self, operator: &str) -> Option<Expr> {
        let id = *self.inner.identities.borrow().get(operator)?;
        Some(self.int(id))
    }

    /// Late-bind a free symbol. Nodes referring to the symbol are
    /// unchanged; resolution happens through [`Expr::value`].
    pub fn bind(&self, name: &str, value: Expr) {
        self.inner.bindings.borrow_mut().insert(name.to_string(), value);
    }

    pub fn binding(&self, name: &str) -> Option<Expr> {
        self.inner.bindings.borrow().get(name).cloned()
    }

    // ---- boxing entry points ----

    pub fn number(&self, value: NumericValue) -> Expr {
        Expr::new(self.clone(), ExprKind::Number(value.canonical()), false)
    }

    pub fn int(&self, value: i64) -> Expr {
        if INTERN_RANGE.contains(&value) {
            let mut cache = self.inner.interned.borrow_mut();
            return cache
                .entry(value)
                .or_insert_with(|| {
                    Expr::new(self.clone(), ExprKind::Number(NumericValue::Int(value)), false)
                })
                .clone();
        }
        self.number(NumericValue::Int(value))
    }

    pub fn float(&self, value: f64) -> Expr {
        self.number(NumericValue::Float(value))
    }

    pub fn big_int(&self, value: BigInt) -> Expr {
        self.number(NumericValue::from_bigint(value))
    }

    pub fn rational(&self, numer: i64, denom: i64) -> Expr {
        self.number(NumericValue::from_ratio(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn decimal(&self, text: &str) -> Result<Expr> {
        NumericValue::from_decimal_str(text)
            .map(|value| self.number(value))
            .ok_or_else(|| {
                CasError::InvalidConstruction(format!("not a decimal literal: {text:?}"))
            })
    }

    pub fn symbol(&self, name: &str) -> Expr {
        Expr::new(self.clone(), ExprKind::Symbol(name.to_string()), false)
    }

    pub fn string(&self, text: &str) -> Expr {
        Expr::new(self.clone(), ExprKind::Str(text.to_string()), false)
    }

    pub fn expr(&self, operator: &str, ops: Vec<Expr>) -> Expr {
        Expr::new(self.clone(), ExprKind::Operator(operator.to_string(), ops), false)
    }

    pub fn dictionary(&self, pairs: Vec<(String, Expr)>) -> Expr {
        Expr::new(self.clone(), ExprKind::Dictionary(pairs), false)
    }

    /// Recursively box raw input into a structural expression tree.
    pub fn boxed(&self, raw: Raw) -> Result<Expr> {
        match raw {
            Raw::Int(i) => Ok(self.int(i)),
            Raw::Float(f) => Ok(self.float(f)),
            Raw::BigInt(n) => Ok(self.big_int(n)),
            Raw::Ratio(n, d) => Ok(self.rational(n, d)),
            Raw::Decimal(text) => self.decimal(&text),
            Raw::Symbol(name) => Ok(self.symbol(&name)),
            Raw::Str(text) => Ok(self.string(&text)),
            Raw::Operator(name, ops) => {
                let ops = ops
                    .into_iter()
                    .map(|op| self.boxed(op))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.expr(&name, ops))
            }
            Raw::Dictionary(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = match key {
                        Raw::Str(text) => text,
                        Raw::Symbol(name) => name,
                        other => {
                            return Err(CasError::InvalidConstruction(format!(
                                "dictionary key must be a string or symbol, got {other:?}"
                            )));
                        }
                    };
                    out.push((key, self.boxed(value)?));
                }
                Ok(self.dictionary(out))
            }
        }
    }

    /// Box raw input and canonicalize the result.
    pub fn boxed_canonical(&self, raw: Raw) -> Result<Expr> {
        Ok(self.boxed(raw)?.to_canonical())
    }
}
