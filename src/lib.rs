//! kinda-lang-core: a source-to-source translator and runtime that
//! augments a host language with fuzzy, probabilistic constructs.
//!
//! The four core subsystems: [`personality`] (the process-wide mood/chaos/
//! seed context), [`registry`] (the static construct catalog), [`runtime`]
//! (the fuzzy primitives emitted code calls), and [`composition`]
//! (composite constructs built from primitives). The [`transformer`] ties
//! them together to translate `.knda` source, guarded by [`validation`].
//! [`config`] resolves personality settings from CLI flags and
//! environment variables.

pub mod composition;
pub mod config;
pub mod error;
pub mod personality;
pub mod registry;
pub mod runtime;
pub mod transformer;
pub mod validation;

pub use composition::{CompositeConstruct, CompositeRegistry, Strategy};
pub use error::{Error, Result};
pub use personality::{Mood, Personality};
pub use registry::Registry;
pub use transformer::{transform, Diagnostic, Severity, TransformOutput};
