use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::ScopedOptions;

/// How a requirement is consumed by the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementTag {
  /// Linked privately, not propagated to consumers.
  Private,
  /// Only needed to build and run the package's tests.
  TestOnly,
}

impl RequirementTag {
  /// Tag for a test framework dependency.
  ///
  /// Dependency managers before major version 2 have no test-only
  /// requirements, so the framework is declared private there.
  pub fn for_test_dependency(tool_major: u32) -> Self {
    if tool_major < 2 { Self::Private } else { Self::TestOnly }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Private => "private",
      Self::TestOnly => "test",
    }
  }
}

impl fmt::Display for RequirementTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A resolved external dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
  pub name: String,
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub revision: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tag: Option<RequirementTag>,
  /// Options forwarded to the dependency.
  #[serde(default, skip_serializing_if = "ScopedOptions::is_empty")]
  pub options: ScopedOptions,
}

impl Requirement {
  pub fn new(name: &str, version: &str) -> Self {
    Self {
      name: name.to_string(),
      version: version.to_string(),
      revision: None,
      tag: None,
      options: ScopedOptions::new(),
    }
  }

  pub fn with_revision(mut self, revision: &str) -> Self {
    self.revision = Some(revision.to_string());
    self
  }

  pub fn with_tag(mut self, tag: RequirementTag) -> Self {
    self.tag = Some(tag);
    self
  }

  /// Reference string, `name/version` or `name/version#revision`.
  pub fn reference(&self) -> String {
    match &self.revision {
      Some(rev) => format!("{}/{}#{}", self.name, self.version, rev),
      None => format!("{}/{}", self.name, self.version),
    }
  }
}

impl fmt::Display for Requirement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.reference())?;
    if let Some(tag) = self.tag {
      write!(f, " ({})", tag)?;
    }
    Ok(())
  }
}
