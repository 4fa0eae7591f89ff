//! Handle to the external build-system generator.
//!
//! The handle collects everything the generator needs to configure, build and
//! install the package, and renders the invocations as argument vectors. It
//! never runs them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::options::OptionSet;
use crate::platform::{BuildType, Settings};
use crate::variables::{VariableMap, VariableValue};

pub const CMAKE_PROGRAM: &str = "cmake";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTool {
  pub program: String,
  pub build_type: BuildType,
  /// Recipe variables, exactly as resolved.
  pub variables: VariableMap,
  /// `fPIC` as resolved, `None` when the option does not exist on the target.
  pub position_independent: Option<bool>,
}

impl BuildTool {
  pub fn new(settings: &Settings, options: &OptionSet, variables: VariableMap) -> Self {
    Self {
      program: CMAKE_PROGRAM.to_string(),
      build_type: settings.build_type,
      variables,
      position_independent: options.is_enabled("fPIC"),
    }
  }

  /// All definitions passed at configure time: the recipe variables plus the
  /// build type and, when `fPIC` is on, position independent code.
  pub fn definitions(&self) -> VariableMap {
    let mut defs = self.variables.clone();
    defs.insert("CMAKE_BUILD_TYPE", VariableValue::Str(self.build_type.to_string()));
    if self.position_independent == Some(true) {
      defs.insert("CMAKE_POSITION_INDEPENDENT_CODE", VariableValue::Bool(true));
    }
    defs
  }

  pub fn configure_args(&self, source_dir: &Path, build_dir: &Path) -> Vec<String> {
    let mut args = vec![
      "-S".to_string(),
      source_dir.display().to_string(),
      "-B".to_string(),
      build_dir.display().to_string(),
    ];
    args.extend(
      self
        .definitions()
        .iter()
        .map(|(name, value)| format!("-D{}={}", name, value.render())),
    );
    args
  }

  pub fn build_args(&self, build_dir: &Path) -> Vec<String> {
    vec![
      "--build".to_string(),
      build_dir.display().to_string(),
      "--config".to_string(),
      self.build_type.to_string(),
    ]
  }

  pub fn install_args(&self, build_dir: &Path) -> Vec<String> {
    vec![
      "--install".to_string(),
      build_dir.display().to_string(),
      "--config".to_string(),
      self.build_type.to_string(),
    ]
  }
}
