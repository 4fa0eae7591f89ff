//! Package recipes.
//!
//! A recipe describes a package: its metadata, the options it declares, the
//! requirement decision table, default options for its dependencies and the
//! build variables it defines. Recipes are plain data and load from JSON.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "fea_libs",
//!   "version": "1.0.0",
//!   "options": [
//!     { "name": "with_tbb", "kind": { "type": "bool" }, "default": false }
//!   ],
//!   "requirements": [
//!     { "when": "always", "name": "gtest", "version": "1.11.0", "tag": "test_dependency" },
//!     { "when": "enabled", "option": "with_tbb", "name": "tbb", "version": "2020.3" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{OptionDecl, OptionValue, ScopedOptions};
use crate::platform::os::Os;
use crate::rules::{DecisionTable, Predicate, Rule, TagPolicy};
use crate::variables::{VariableTemplate, VariableValue};

#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("failed to read recipe {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse recipe: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("invalid exports pattern '{pattern}': {message}")]
  ExportPattern { pattern: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
  pub name: String,
  pub version: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub topics: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub homepage: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub license: Option<String>,
  #[serde(default)]
  pub settings: Vec<String>,
  #[serde(default)]
  pub generators: Vec<String>,
  /// Glob patterns, evaluated in order. A `!` prefix excludes.
  #[serde(default)]
  pub exports_sources: Vec<String>,
  #[serde(default)]
  pub options: Vec<OptionDecl>,
  /// Default options for dependencies, keyed by dependency name.
  #[serde(default)]
  pub dependency_options: BTreeMap<String, ScopedOptions>,
  #[serde(default)]
  pub requirements: DecisionTable,
  #[serde(default)]
  pub variables: VariableTemplate,
}

impl Recipe {
  /// The built-in recipe for the `fea_libs` C++ utility library.
  pub fn fea_libs() -> Self {
    let threading = "threading";

    Self {
      name: "fea_libs".to_string(),
      version: "1.0.0".to_string(),
      description: "A collection of useful libraries and utilities.".to_string(),
      topics: ["maps", "containers", "algorithms"].map(String::from).to_vec(),
      url: Some("https://github.com/p-groarke/fea_libs".to_string()),
      homepage: Some("https://github.com/p-groarke/fea_libs".to_string()),
      license: Some("BSD-3".to_string()),
      settings: ["os", "compiler", "build_type", "arch"].map(String::from).to_vec(),
      generators: vec!["cmake_find_package_multi".to_string()],
      exports_sources: ["*", "!build/*", "!build_reports/*", "!Output/*", "!bin/*"]
        .map(String::from)
        .to_vec(),
      options: vec![
        OptionDecl::toggle("fPIC", true).removed_on(Os::Windows),
        OptionDecl::toggle("with_tbb", false),
        OptionDecl::toggle("with_onetbb", true),
        OptionDecl::toggle("with_date", true),
      ],
      dependency_options: BTreeMap::from([
        scoped("gtest", "build_gmock", false),
        scoped("date", "use_system_tz_db", true),
        scoped("onetbb", "tbbmalloc", true),
        scoped("tbb", "tbbmalloc", true),
      ]),
      requirements: DecisionTable::new(vec![
        Rule::new(Predicate::Always, "gtest", "1.11.0").tagged(TagPolicy::TestDependency),
        Rule::new(Predicate::enabled("with_date"), "date", "3.0.0"),
        Rule::new(Predicate::enabled("with_onetbb"), "onetbb", "2021.3.0").in_group(threading),
        Rule::new(Predicate::enabled("with_tbb"), "tbb", "2020.3").in_group(threading),
      ]),
      variables: VariableTemplate {
        prefix: "FEA_".to_string(),
        fixed: BTreeMap::from([
          ("FEA_TESTS".to_string(), VariableValue::Bool(false)),
          ("FEA_BENCHMARKS".to_string(), VariableValue::Bool(false)),
          ("FEA_PULL_CONAN".to_string(), VariableValue::Bool(false)),
        ]),
        passthrough: ["with_tbb", "with_onetbb", "with_date"].map(String::from).to_vec(),
      },
    }
  }

  pub fn from_json(json: &str) -> Result<Self, RecipeError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn from_file(path: &Path) -> Result<Self, RecipeError> {
    let content = fs::read_to_string(path).map_err(|source| RecipeError::Read {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_json(&content)
  }

  pub fn option(&self, name: &str) -> Option<&OptionDecl> {
    self.options.iter().find(|decl| decl.name == name)
  }

  /// Whether `path` (relative, `/`-separated) is exported with the sources.
  ///
  /// The last pattern that matches decides.
  pub fn exports(&self, path: &str) -> Result<bool, RecipeError> {
    let mut exported = false;
    for raw in &self.exports_sources {
      let (negated, pattern) = match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw.as_str()),
      };
      let pattern = Pattern::new(pattern).map_err(|e| RecipeError::ExportPattern {
        pattern: raw.clone(),
        message: e.to_string(),
      })?;
      if pattern.matches(path) {
        exported = !negated;
      }
    }
    Ok(exported)
  }
}

fn scoped(dependency: &str, option: &str, value: bool) -> (String, ScopedOptions) {
  (
    dependency.to_string(),
    ScopedOptions::from([(option.to_string(), OptionValue::Bool(value))]),
  )
}
