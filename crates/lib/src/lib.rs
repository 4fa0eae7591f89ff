//! pkgplan-lib: Recipe resolution for pkgplan
//!
//! This crate computes, from a package recipe and a build environment, the
//! plan an external build tool executes:
//! - `OptionSet`: final option values after platform pruning
//! - `Requirement`: dependencies selected by the recipe's decision table
//! - `VariableMap`: definitions injected into the build-system generator
//! - `CopyPlan`: artifact copies staged after build and after packaging

pub mod build_tool;
pub mod consts;
pub mod copy;
pub mod error;
pub mod options;
pub mod package;
pub mod platform;
pub mod recipe;
pub mod requirement;
pub mod resolve;
pub mod rules;
pub mod util;
pub mod variables;

pub use error::ConfigurationError;
pub use resolve::{Resolution, ResolveContext, resolve};
