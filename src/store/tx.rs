//! Conditional multi-node commit.
//!
//! A [`Transaction`] bundles everything one checkout has to do: numeric
//! guards that must hold at commit time, the order node to create, and the
//! counter adjustments (stock decrements, points delta). The actor validates
//! every guard and adjustment target before touching the tree, so the commit
//! is all-or-nothing even under interleaved clients.

use serde_json::Value;

use super::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cond {
    /// The number at the path must be at least this value.
    AtLeast(f64),
    /// The number at the path must equal this value exactly.
    Equals(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub path: Path,
    pub cond: Cond,
}

impl Guard {
    pub fn at_least(path: Path, min: f64) -> Self {
        Self {
            path,
            cond: Cond::AtLeast(min),
        }
    }

    pub fn equals(path: Path, expected: f64) -> Self {
        Self {
            path,
            cond: Cond::Equals(expected),
        }
    }

    pub fn holds(&self, observed: f64) -> bool {
        match self.cond {
            Cond::AtLeast(min) => observed >= min,
            Cond::Equals(expected) => observed == expected,
        }
    }
}

/// Numeric delta applied to a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjust {
    pub path: Path,
    pub delta: f64,
}

#[derive(Debug)]
pub struct Transaction {
    pub guards: Vec<Guard>,
    /// Parent path and value of the single node pushed by the commit; the
    /// generated child id is the commit's result.
    pub create: (Path, Value),
    pub adjustments: Vec<Adjust>,
}

impl Transaction {
    pub fn new(create_under: Path, value: Value) -> Self {
        Self {
            guards: Vec::new(),
            create: (create_under, value),
            adjustments: Vec::new(),
        }
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn adjust(mut self, path: Path, delta: f64) -> Self {
        self.adjustments.push(Adjust { path, delta });
        self
    }
}
