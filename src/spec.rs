//! The tagged tree describing a binary format.

use std::collections::HashMap;
use std::sync::Arc;

use crate::int_spec::IntSpec;

/// An opaque identifier bound by [`Spec::Variable`] and read by
/// [`Spec::Bytes`], [`Spec::Until`], [`Spec::Repeat`], and [`Spec::Switch`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarName(Arc<str>);

impl VarName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VarName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VarName {
    fn from(s: &str) -> Self {
        VarName::new(s)
    }
}

/// The variable environment threaded through a single parse or encode
/// traversal: name -> u64. Flat, never shadowed or redefined within a parse.
pub type VarEnv = HashMap<VarName, u64>;

/// The format description tree. Recursive arms are `Box`-indirected; no
/// cycles are possible by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spec {
    /// Consume `n` bytes, yield `Empty`.
    Skip(u32),
    /// Abort parsing of the enclosing stream (absorbed by an enclosing `Until`).
    Stop,
    /// Read an integer, yield `Integer`.
    Integer(IntSpec),
    /// Read an integer, bind `name := value`, yield `Integer`.
    Variable(IntSpec, VarName),
    /// Read `env[name]` bytes, yield `Bytes`.
    Bytes(VarName),
    /// Parse children in order, yield `Seq`.
    Seq(Vec<Spec>),
    /// Read `env[name]` bytes as a substream, repeatedly apply `inner` until
    /// exhausted, yield `Seq`. An inner `Stop` is absorbed and surfaces as a
    /// trailing `Stop` element.
    Until(VarName, Box<Spec>),
    /// Apply `inner` exactly `env[name]` times, yield `Seq`.
    Repeat(VarName, Box<Spec>),
    /// Select `cases[env[selector]]` else `default`; parse as that.
    Switch {
        selector: VarName,
        cases: Vec<(u64, Spec)>,
        default: Box<Spec>,
    },
}

impl Spec {
    pub fn switch(selector: impl Into<VarName>, cases: Vec<(u64, Spec)>, default: Spec) -> Spec {
        #[cfg(debug_assertions)]
        {
            let mut seen = std::collections::HashSet::new();
            for (k, _) in &cases {
                assert!(seen.insert(*k), "Switch.cases keys must be unique, duplicate {k}");
            }
        }
        Spec::Switch {
            selector: selector.into(),
            cases,
            default: Box::new(default),
        }
    }

    pub fn until(name: impl Into<VarName>, inner: Spec) -> Spec {
        Spec::Until(name.into(), Box::new(inner))
    }

    pub fn repeat(name: impl Into<VarName>, inner: Spec) -> Spec {
        Spec::Repeat(name.into(), Box::new(inner))
    }

    pub fn variable(int_spec: IntSpec, name: impl Into<VarName>) -> Spec {
        Spec::Variable(int_spec, name.into())
    }

    pub fn bytes(name: impl Into<VarName>) -> Spec {
        Spec::Bytes(name.into())
    }

    /// Looks up `cases[selector]`, falling back to `default`.
    pub(crate) fn switch_branch<'a>(
        selector: u64,
        cases: &'a [(u64, Spec)],
        default: &'a Spec,
    ) -> &'a Spec {
        cases
            .iter()
            .find(|(k, _)| *k == selector)
            .map(|(_, s)| s)
            .unwrap_or(default)
    }
}
