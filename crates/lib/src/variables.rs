//! Build-system variables injected into the external build invocation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::{OptionSet, OptionValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
  Bool(bool),
  Str(String),
}

impl VariableValue {
  /// Render for a `-DNAME=VALUE` definition. Booleans become `ON`/`OFF`.
  pub fn render(&self) -> String {
    match self {
      Self::Bool(true) => "ON".to_string(),
      Self::Bool(false) => "OFF".to_string(),
      Self::Str(s) => s.clone(),
    }
  }
}

impl From<&OptionValue> for VariableValue {
  fn from(value: &OptionValue) -> Self {
    match value {
      OptionValue::Bool(b) => Self::Bool(*b),
      OptionValue::Choice(s) => Self::Str(s.clone()),
    }
  }
}

impl fmt::Display for VariableValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bool(b) => write!(f, "{}", b),
      Self::Str(s) => write!(f, "{}", s),
    }
  }
}

/// Variable name to value, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableMap(BTreeMap<String, VariableValue>);

impl VariableMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, name: &str) -> Option<&VariableValue> {
    self.0.get(name)
  }

  pub fn insert(&mut self, name: &str, value: VariableValue) {
    self.0.insert(name.to_string(), value);
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Which variables a recipe defines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableTemplate {
  /// Prepended to the uppercased name of each passthrough option.
  pub prefix: String,
  /// Definitions that do not depend on options.
  #[serde(default)]
  pub fixed: BTreeMap<String, VariableValue>,
  /// Options passed through verbatim.
  #[serde(default)]
  pub passthrough: Vec<String>,
}

impl VariableTemplate {
  pub fn variable_name(&self, option: &str) -> String {
    format!("{}{}", self.prefix, option.to_ascii_uppercase())
  }

  pub fn build(&self, options: &OptionSet) -> VariableMap {
    let mut vars = VariableMap::new();
    for (name, value) in &self.fixed {
      vars.insert(name, value.clone());
    }

    for option in &self.passthrough {
      match options.get(option) {
        Some(value) => vars.insert(&self.variable_name(option), value.into()),
        None => debug!(option = %option, "passthrough option not present, no variable defined"),
      }
    }
    vars
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn template() -> VariableTemplate {
    VariableTemplate {
      prefix: "FEA_".to_string(),
      fixed: BTreeMap::from([("FEA_TESTS".to_string(), VariableValue::Bool(false))]),
      passthrough: vec!["with_tbb".to_string(), "fPIC".to_string()],
    }
  }

  #[test]
  fn passthrough_uses_prefixed_uppercase_name() {
    let mut options = OptionSet::new();
    options.insert("with_tbb", OptionValue::Bool(true));
    options.insert("fPIC", OptionValue::Bool(false));

    let vars = template().build(&options);

    assert_eq!(vars.get("FEA_WITH_TBB"), Some(&VariableValue::Bool(true)));
    assert_eq!(vars.get("FEA_FPIC"), Some(&VariableValue::Bool(false)));
    assert_eq!(vars.get("FEA_TESTS"), Some(&VariableValue::Bool(false)));
  }

  #[test]
  fn absent_passthrough_option_defines_nothing() {
    let mut options = OptionSet::new();
    options.insert("with_tbb", OptionValue::Bool(false));

    let vars = template().build(&options);

    assert_eq!(vars.len(), 2);
    assert!(vars.get("FEA_FPIC").is_none());
  }

  #[test]
  fn render_uses_on_off_for_booleans() {
    assert_eq!(VariableValue::Bool(true).render(), "ON");
    assert_eq!(VariableValue::Bool(false).render(), "OFF");
    assert_eq!(VariableValue::Str("static".to_string()).render(), "static");
  }
}
