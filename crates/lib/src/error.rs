//! Configuration errors raised while resolving a recipe.

use thiserror::Error;

/// Resolution reached an inconsistent state.
///
/// These are raised before any part of the plan is produced, so a caller
/// never runs a build or copy step for a recipe that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
  /// A requirement rule depends on an option that is not in the final option set.
  #[error("requirement '{requirement}' depends on option '{option}', which is not declared")]
  MissingOption { option: String, requirement: String },

  /// An override names an option the recipe does not declare.
  #[error("unknown option '{0}'")]
  UnknownOption(String),

  /// An override value does not fit the option's kind.
  #[error("invalid value '{value}' for option '{option}' (expected {expected})")]
  InvalidValue {
    option: String,
    value: String,
    expected: String,
  },

  /// A requirement rule tests an option that is not a boolean toggle.
  #[error("option '{0}' is not a boolean and cannot select a requirement")]
  NotBoolean(String),

  /// A settings field could not be parsed.
  #[error("invalid {setting} setting '{value}'")]
  InvalidSetting { setting: &'static str, value: String },

  /// An option override was not of the form `name=value` or `dep:name=value`.
  #[error("malformed option override '{0}' (expected name=value or dependency:name=value)")]
  MalformedOverride(String),
}
