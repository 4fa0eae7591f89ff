//! Artifact copy plans.
//!
//! A copy plan lists the glob-driven copies that move runtime binaries and debug
//! symbols into place. It is computed during resolution without touching the
//! filesystem and executed later, one phase at a time.
//!
//! # Submodules
//!
//! - [`execute`] - Best-effort execution of copy operations
//! - [`graph`] - Where each resolved dependency keeps its binaries

pub mod execute;
pub mod graph;
mod plan;

pub use graph::{DependencyCache, DependencyGraph, StaticGraph};
pub use plan::*;
