//! The name-to-expression mapping produced by a successful match.

use std::fmt;

use crate::expr::Expr;

/// Ordered wildcard bindings. Threaded through the matcher by value
/// (cloned per branch, never mutated in place), so a failed permutation or
/// sequence branch cannot corrupt bindings made on a sibling branch.
#[derive(Clone, Default)]
pub struct Substitution {
    entries: Vec<(String, Expr)>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution::default()
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    /// Record a binding. The matcher checks consistency before calling;
    /// rebinding a name replaces the entry.
    pub fn bind(&mut self, name: String, value: Expr) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, expr) in self.iter() {
            map.entry(&name, &format_args!("{expr}"));
        }
        map.finish()
    }
}
