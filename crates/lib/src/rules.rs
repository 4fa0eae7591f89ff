//! Requirement selection as a priority-ordered decision table.
//!
//! Each [`Rule`] pairs a predicate over the final options with the requirement
//! it contributes. Rules are evaluated in declaration order. Rules that share an
//! exclusive `group` are mutually exclusive: the first one whose predicate holds
//! claims the group and later members are skipped. This is how a recipe states
//! that one backend wins a tie against another.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigurationError;
use crate::options::OptionSet;
use crate::requirement::{Requirement, RequirementTag};

/// Condition under which a rule contributes its requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Predicate {
  Always,
  /// Holds when the named boolean option is `true`.
  Enabled { option: String },
}

impl Predicate {
  pub fn enabled(option: &str) -> Self {
    Self::Enabled {
      option: option.to_string(),
    }
  }

  /// The option this predicate reads, if any.
  pub fn option(&self) -> Option<&str> {
    match self {
      Self::Always => None,
      Self::Enabled { option } => Some(option),
    }
  }

  fn evaluate(&self, options: &OptionSet, requirement: &str) -> Result<bool, ConfigurationError> {
    match self {
      Self::Always => Ok(true),
      Self::Enabled { option: name } => match options.get(name) {
        None => Err(ConfigurationError::MissingOption {
          option: name.clone(),
          requirement: requirement.to_string(),
        }),
        Some(value) => value.as_bool().ok_or_else(|| ConfigurationError::NotBoolean(name.clone())),
      },
    }
  }
}

/// How the consumption tag of a selected requirement is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPolicy {
  #[default]
  Untagged,
  /// Depends on the dependency manager's major version, see
  /// [`RequirementTag::for_test_dependency`].
  TestDependency,
  Fixed(RequirementTag),
}

impl TagPolicy {
  pub fn resolve(&self, tool_major: u32) -> Option<RequirementTag> {
    match self {
      Self::Untagged => None,
      Self::TestDependency => Some(RequirementTag::for_test_dependency(tool_major)),
      Self::Fixed(tag) => Some(*tag),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  #[serde(flatten)]
  pub predicate: Predicate,
  pub name: String,
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub revision: Option<String>,
  #[serde(default)]
  pub tag: TagPolicy,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group: Option<String>,
}

impl Rule {
  pub fn new(predicate: Predicate, name: &str, version: &str) -> Self {
    Self {
      predicate,
      name: name.to_string(),
      version: version.to_string(),
      revision: None,
      tag: TagPolicy::Untagged,
      group: None,
    }
  }

  pub fn tagged(mut self, tag: TagPolicy) -> Self {
    self.tag = tag;
    self
  }

  pub fn in_group(mut self, group: &str) -> Self {
    self.group = Some(group.to_string());
    self
  }

  pub fn with_revision(mut self, revision: &str) -> Self {
    self.revision = Some(revision.to_string());
    self
  }

  fn requirement(&self, tool_major: u32) -> Requirement {
    Requirement {
      name: self.name.clone(),
      version: self.version.clone(),
      revision: self.revision.clone(),
      tag: self.tag.resolve(tool_major),
      options: Default::default(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionTable {
  rules: Vec<Rule>,
}

impl DecisionTable {
  pub fn new(rules: Vec<Rule>) -> Self {
    Self { rules }
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  /// Check that every option a rule reads is present and boolean.
  ///
  /// Runs over the whole table, so a missing option fails even when an
  /// earlier rule of the same group would have won.
  pub fn validate(&self, options: &OptionSet) -> Result<(), ConfigurationError> {
    for rule in &self.rules {
      rule.predicate.evaluate(options, &rule.name)?;
    }
    Ok(())
  }

  /// Select the requirements for `options`, in table order.
  pub fn select(&self, options: &OptionSet, tool_major: u32) -> Result<Vec<Requirement>, ConfigurationError> {
    self.validate(options)?;

    let mut claimed: BTreeSet<&str> = BTreeSet::new();
    let mut selected = Vec::new();

    for rule in &self.rules {
      if let Some(group) = rule.group.as_deref()
        && claimed.contains(group)
      {
        if rule.predicate.evaluate(options, &rule.name)? {
          debug!(requirement = %rule.name, group, "skipping requirement, group already satisfied");
        }
        continue;
      }

      if !rule.predicate.evaluate(options, &rule.name)? {
        continue;
      }

      if let Some(group) = rule.group.as_deref() {
        claimed.insert(group);
      }
      debug!(requirement = %rule.name, version = %rule.version, "requirement selected");
      selected.push(rule.requirement(tool_major));
    }

    for group in self.groups() {
      if !claimed.contains(group) {
        warn!(group, "no requirement selected for exclusive group");
      }
    }

    Ok(selected)
  }

  fn groups(&self) -> BTreeSet<&str> {
    self.rules.iter().filter_map(|r| r.group.as_deref()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::options::OptionValue;

  fn threading_table() -> DecisionTable {
    DecisionTable::new(vec![
      Rule::new(Predicate::Always, "gtest", "1.11.0").tagged(TagPolicy::TestDependency),
      Rule::new(Predicate::enabled("with_onetbb"), "onetbb", "2021.3.0").in_group("threading"),
      Rule::new(Predicate::enabled("with_tbb"), "tbb", "2020.3").in_group("threading"),
    ])
  }

  fn options(onetbb: bool, tbb: bool) -> OptionSet {
    let mut set = OptionSet::new();
    set.insert("with_onetbb", OptionValue::Bool(onetbb));
    set.insert("with_tbb", OptionValue::Bool(tbb));
    set
  }

  fn names(reqs: &[Requirement]) -> Vec<&str> {
    reqs.iter().map(|r| r.name.as_str()).collect()
  }

  #[test]
  fn first_rule_in_group_wins_tie() {
    let reqs = threading_table().select(&options(true, true), 2).unwrap();
    assert_eq!(names(&reqs), ["gtest", "onetbb"]);
  }

  #[test]
  fn later_rule_in_group_applies_when_first_is_off() {
    let reqs = threading_table().select(&options(false, true), 2).unwrap();
    assert_eq!(names(&reqs), ["gtest", "tbb"]);
  }

  #[test]
  fn unclaimed_group_selects_nothing() {
    let reqs = threading_table().select(&options(false, false), 2).unwrap();
    assert_eq!(names(&reqs), ["gtest"]);
  }

  #[test]
  fn missing_option_fails_even_if_group_is_claimed() {
    let mut set = OptionSet::new();
    set.insert("with_onetbb", OptionValue::Bool(true));

    let err = threading_table().select(&set, 2).unwrap_err();
    assert_eq!(
      err,
      ConfigurationError::MissingOption {
        option: "with_tbb".to_string(),
        requirement: "tbb".to_string(),
      }
    );
  }

  #[test]
  fn choice_option_cannot_drive_predicate() {
    let mut set = options(true, false);
    set.insert("with_tbb", OptionValue::Choice("yes".to_string()));

    let err = threading_table().select(&set, 2).unwrap_err();
    assert_eq!(err, ConfigurationError::NotBoolean("with_tbb".to_string()));
  }

  #[test]
  fn tag_policy_follows_tool_version() {
    let old = threading_table().select(&options(false, false), 1).unwrap();
    let new = threading_table().select(&options(false, false), 2).unwrap();

    assert_eq!(old[0].tag, Some(RequirementTag::Private));
    assert_eq!(new[0].tag, Some(RequirementTag::TestOnly));
    assert_eq!(old[0].version, new[0].version);
  }

  #[test]
  fn table_serializes_predicates_inline() {
    let rule = Rule::new(Predicate::enabled("with_date"), "date", "3.0.0");
    let json = serde_json::to_value(&rule).unwrap();

    assert_eq!(json["when"], "enabled");
    assert_eq!(json["option"], "with_date");

    let back: Rule = serde_json::from_value(json).unwrap();
    assert_eq!(back, rule);
  }
}
