//! Package options: declarations, user overrides and the final option set.
//!
//! An option is either a boolean toggle or one member of a fixed choice list.
//! Resolution starts from the declared defaults, applies the user's overrides,
//! then drops options that do not apply to the target OS. A dropped option is
//! absent from the [`OptionSet`], which is not the same as being `false`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigurationError;
use crate::platform::os::Os;

/// Value of a single option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
  Bool(bool),
  Choice(String),
}

impl OptionValue {
  /// Interpret a value as written on a command line.
  ///
  /// `true` and `false` in any case become booleans, anything else is a choice.
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
      Self::Bool(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
      Self::Bool(false)
    } else {
      Self::Choice(trimmed.to_string())
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      Self::Choice(_) => None,
    }
  }
}

impl From<bool> for OptionValue {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    Self::Choice(value.to_string())
  }
}

impl fmt::Display for OptionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bool(b) => write!(f, "{}", b),
      Self::Choice(s) => write!(f, "{}", s),
    }
  }
}

/// The values an option accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum OptionKind {
  Bool,
  Choice(Vec<String>),
}

/// An option declared by a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
  pub name: String,
  pub kind: OptionKind,
  pub default: OptionValue,
  /// Operating systems on which the option does not exist.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub removed_on: Vec<Os>,
}

impl OptionDecl {
  /// A boolean toggle.
  pub fn toggle(name: &str, default: bool) -> Self {
    Self {
      name: name.to_string(),
      kind: OptionKind::Bool,
      default: OptionValue::Bool(default),
      removed_on: Vec::new(),
    }
  }

  /// An option restricted to `values`.
  pub fn choice(name: &str, values: &[&str], default: &str) -> Self {
    Self {
      name: name.to_string(),
      kind: OptionKind::Choice(values.iter().map(|v| v.to_string()).collect()),
      default: OptionValue::Choice(default.to_string()),
      removed_on: Vec::new(),
    }
  }

  /// Mark the option as nonexistent on `os`.
  pub fn removed_on(mut self, os: Os) -> Self {
    self.removed_on.push(os);
    self
  }

  pub fn applies_to(&self, os: Os) -> bool {
    !self.removed_on.contains(&os)
  }

  /// Validate `value` against this option's kind.
  pub fn check(&self, value: &OptionValue) -> Result<OptionValue, ConfigurationError> {
    match (&self.kind, value) {
      (OptionKind::Bool, OptionValue::Bool(_)) => Ok(value.clone()),
      (OptionKind::Choice(values), OptionValue::Choice(v)) if values.contains(v) => Ok(value.clone()),
      (OptionKind::Bool, _) => Err(ConfigurationError::InvalidValue {
        option: self.name.clone(),
        value: value.to_string(),
        expected: "true or false".to_string(),
      }),
      (OptionKind::Choice(values), _) => Err(ConfigurationError::InvalidValue {
        option: self.name.clone(),
        value: value.to_string(),
        expected: format!("one of {}", values.join(", ")),
      }),
    }
  }
}

/// The final, platform-pruned options of a resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeMap<String, OptionValue>);

impl OptionSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, name: &str) -> Option<&OptionValue> {
    self.0.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  /// `Some(true)` only for a present boolean option set to `true`.
  pub fn is_enabled(&self, name: &str) -> Option<bool> {
    self.get(name).and_then(OptionValue::as_bool)
  }

  pub fn insert(&mut self, name: &str, value: OptionValue) -> Option<OptionValue> {
    self.0.insert(name.to_string(), value)
  }

  pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
    self.0.remove(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Options of one dependency, keyed by option name.
pub type ScopedOptions = BTreeMap<String, OptionValue>;

/// Option values supplied by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
  package: BTreeMap<String, OptionValue>,
  scoped: BTreeMap<String, ScopedOptions>,
}

impl RawOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder form of [`RawOptions::insert`].
  pub fn set(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
    self.insert(name, value);
    self
  }

  /// Builder form of [`RawOptions::insert_scoped`].
  pub fn set_scoped(mut self, dependency: &str, name: &str, value: impl Into<OptionValue>) -> Self {
    self.insert_scoped(dependency, name, value);
    self
  }

  pub fn insert(&mut self, name: &str, value: impl Into<OptionValue>) {
    self.package.insert(name.to_string(), value.into());
  }

  pub fn insert_scoped(&mut self, dependency: &str, name: &str, value: impl Into<OptionValue>) {
    self
      .scoped
      .entry(dependency.to_string())
      .or_default()
      .insert(name.to_string(), value.into());
  }

  /// Parse an override of the form `name=value` or `dependency:name=value`.
  pub fn parse_override(&mut self, raw: &str) -> Result<(), ConfigurationError> {
    let malformed = || ConfigurationError::MalformedOverride(raw.to_string());

    let (key, value) = raw.split_once('=').ok_or_else(malformed)?;
    let key = key.trim();
    if key.is_empty() {
      return Err(malformed());
    }

    match key.split_once(':') {
      Some((dep, name)) => {
        let (dep, name) = (dep.trim(), name.trim());
        if dep.is_empty() || name.is_empty() {
          return Err(malformed());
        }
        self.insert_scoped(dep, name, OptionValue::parse(value));
      }
      None => self.insert(key, OptionValue::parse(value)),
    }
    Ok(())
  }

  /// Collect overrides from an iterator of `name=value` strings.
  pub fn from_overrides<I, S>(overrides: I) -> Result<Self, ConfigurationError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut raw = Self::new();
    for item in overrides {
      raw.parse_override(item.as_ref())?;
    }
    Ok(raw)
  }

  pub fn package(&self) -> &BTreeMap<String, OptionValue> {
    &self.package
  }

  pub fn scoped(&self) -> &BTreeMap<String, ScopedOptions> {
    &self.scoped
  }
}

/// Compute the final option set for `os`.
///
/// Every override must name a declared option and fit its kind, including
/// overrides of options that are then removed for the platform.
pub fn resolve_options(decls: &[OptionDecl], raw: &RawOptions, os: Os) -> Result<OptionSet, ConfigurationError> {
  if let Some(unknown) = raw.package().keys().find(|name| !decls.iter().any(|d| &d.name == *name)) {
    return Err(ConfigurationError::UnknownOption(unknown.clone()));
  }

  let mut options = OptionSet::new();
  for decl in decls {
    let value = match raw.package().get(&decl.name) {
      Some(value) => decl.check(value)?,
      None => decl.default.clone(),
    };

    if decl.applies_to(os) {
      options.insert(&decl.name, value);
    } else {
      debug!(option = %decl.name, %os, "option removed for platform");
    }
  }

  Ok(options)
}

/// Merge user overrides on top of a recipe's dependency defaults.
pub fn merge_scoped(
  defaults: &BTreeMap<String, ScopedOptions>,
  raw: &RawOptions,
) -> BTreeMap<String, ScopedOptions> {
  let mut merged = defaults.clone();
  for (dep, values) in raw.scoped() {
    let entry = merged.entry(dep.clone()).or_default();
    for (name, value) in values {
      entry.insert(name.clone(), value.clone());
    }
  }
  merged
}
