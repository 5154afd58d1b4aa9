//! Static catalog of kinda constructs.
//!
//! The registry answers two questions the transformer needs on every
//! line: which registered whole-line construct (if any) matches, and in
//! what priority order should candidates be tried. Emission itself is
//! implemented per-construct in [`crate::transformer`]; the registry
//! does not hold "emits" templates as strings, only the metadata needed
//! to recognize and prioritize a match and to track which runtime
//! helpers it pulls in.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// The five construct kinds, in scanning priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConstructKind {
    BlockOpener,
    Declaration,
    Print,
    Expression,
    Statement,
}

/// Immutable descriptor for a single registered construct.
pub struct ConstructDescriptor {
    pub name: &'static str,
    pub kind: ConstructKind,
    pub pattern: Regex,
    /// Runtime helper(s) an emission of this construct pulls into
    /// `used_helpers`.
    pub runtime_helpers: &'static [&'static str],
}

/// Catalog of all registered primitive constructs, ordered for scanning.
pub struct Registry {
    ordered: Vec<ConstructDescriptor>,
    by_name: IndexMap<&'static str, usize>,
}

impl Registry {
    fn build() -> Result<Self> {
        let mut entries = builtin_descriptors()?;
        // Stable sort: within equal kind, registration order is preserved.
        entries.sort_by_key(|d| d.kind);

        let mut by_name = IndexMap::new();
        for (idx, d) in entries.iter().enumerate() {
            if by_name.insert(d.name, idx).is_some() {
                return Err(Error::DuplicateConstruct(d.name.to_string()));
            }
        }
        Ok(Self { ordered: entries, by_name })
    }

    /// The process-wide registry, built once.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            Registry::build().expect("builtin construct registry is internally consistent")
        })
    }

    /// Iterate descriptors in scanning priority order.
    pub fn iter_in_priority_order(&self) -> impl Iterator<Item = &ConstructDescriptor> {
        self.ordered.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ConstructDescriptor> {
        self.by_name.get(name).map(|&idx| &self.ordered[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ordered.iter().map(|d| d.name)
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::BadPattern { name: name.to_string(), source })
}

fn builtin_descriptors() -> Result<Vec<ConstructDescriptor>> {
    Ok(vec![
        ConstructDescriptor {
            name: "sometimes_block",
            kind: ConstructKind::BlockOpener,
            pattern: compile("sometimes_block", r"^~sometimes\s*\((?P<cond>.+)\)\s*\{$")?,
            runtime_helpers: &["sometimes"],
        },
        ConstructDescriptor {
            name: "maybe_for",
            kind: ConstructKind::BlockOpener,
            pattern: compile(
                "maybe_for",
                r"^~maybe_for\s+(?P<var>[A-Za-z_][A-Za-z0-9_]*)\s+in\s+(?P<iter>.+):$",
            )?,
            runtime_helpers: &["maybe_for"],
        },
        ConstructDescriptor {
            name: "sometimes_while",
            kind: ConstructKind::BlockOpener,
            pattern: compile("sometimes_while", r"^~sometimes_while\s+(?P<cond>.+):$")?,
            runtime_helpers: &["sometimes_while"],
        },
        ConstructDescriptor {
            name: "kinda_repeat",
            kind: ConstructKind::BlockOpener,
            pattern: compile("kinda_repeat", r"^~kinda_repeat\s*\(\s*(?P<n>.+?)\s*\)\s*:$")?,
            runtime_helpers: &["kinda_repeat_count"],
        },
        ConstructDescriptor {
            name: "eventually_until",
            kind: ConstructKind::BlockOpener,
            pattern: compile("eventually_until", r"^~eventually_until\s+(?P<cond>.+):$")?,
            runtime_helpers: &["eventually_until"],
        },
        ConstructDescriptor {
            name: "sorta_print",
            kind: ConstructKind::Print,
            pattern: compile("sorta_print", r"^~sorta\s+print\s*\((?P<args>.*)\)$")?,
            runtime_helpers: &["sorta_print"],
        },
    ])
}
