//! Configuration resolution.
//!
//! Resolution turns a recipe, a settings snapshot, the user's option
//! overrides and the dependency manager's major version into a [`Resolution`]:
//! the final options, the ordered requirements, the build variables and the
//! copy plan. It is pure. Nothing is read from or written to disk unless the
//! caller supplies a [`DependencyGraph`] that looks at the filesystem.
//!
//! All validation happens when the [`ResolveContext`] is created, so a recipe
//! that cannot be resolved fails before any plan exists.

use std::collections::BTreeMap;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::build_tool::BuildTool;
use crate::copy::{CopyPlan, DependencyCache, DependencyGraph, Layout};
use crate::error::ConfigurationError;
use crate::options::{OptionSet, RawOptions, ScopedOptions, merge_scoped, resolve_options};
use crate::platform::Settings;
use crate::recipe::Recipe;
use crate::requirement::Requirement;
use crate::util::hash::Hashable;
use crate::variables::VariableMap;

/// The complete output of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
  pub settings: Settings,
  pub tool_major: u32,
  pub options: OptionSet,
  pub requirements: Vec<Requirement>,
  pub variables: VariableMap,
  pub copy_plan: CopyPlan,
}

impl Hashable for Resolution {}

impl Resolution {
  pub fn requirement(&self, name: &str) -> Option<&Requirement> {
    self.requirements.iter().find(|r| r.name == name)
  }
}

/// State for a single resolution.
///
/// Owns the memoized [`BuildTool`] handle. A context is built per invocation
/// and dropped afterwards, so nothing is shared between resolutions.
pub struct ResolveContext<'a> {
  recipe: &'a Recipe,
  settings: Settings,
  tool_major: u32,
  options: OptionSet,
  dependency_options: BTreeMap<String, ScopedOptions>,
  layout: Layout,
  graph: Box<dyn DependencyGraph + 'a>,
  build_tool: OnceCell<BuildTool>,
}

impl<'a> ResolveContext<'a> {
  /// Resolve and validate options for `settings`.
  ///
  /// Fails if an override is invalid or if a requirement rule reads an option
  /// that is missing from the final option set.
  pub fn new(
    recipe: &'a Recipe,
    settings: Settings,
    raw: &RawOptions,
    tool_major: u32,
  ) -> Result<Self, ConfigurationError> {
    let options = resolve_options(&recipe.options, raw, settings.os)?;
    recipe.requirements.validate(&options)?;

    Ok(Self {
      recipe,
      settings,
      tool_major,
      options,
      dependency_options: merge_scoped(&recipe.dependency_options, raw),
      layout: Layout::default(),
      graph: Box::new(DependencyCache::symbolic()),
      build_tool: OnceCell::new(),
    })
  }

  pub fn with_layout(mut self, layout: Layout) -> Self {
    self.layout = layout;
    self
  }

  pub fn with_graph(mut self, graph: impl DependencyGraph + 'a) -> Self {
    self.graph = Box::new(graph);
    self
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn options(&self) -> &OptionSet {
    &self.options
  }

  /// The build-tool handle, constructed on first use.
  pub fn build_tool(&self) -> &BuildTool {
    self.build_tool.get_or_init(|| {
      debug!(recipe = %self.recipe.name, "constructing build tool handle");
      let variables = self.recipe.variables.build(&self.options);
      BuildTool::new(&self.settings, &self.options, variables)
    })
  }

  pub fn variables(&self) -> &VariableMap {
    &self.build_tool().variables
  }

  /// Requirements in table order, with their dependency options attached.
  pub fn requirements(&self) -> Result<Vec<Requirement>, ConfigurationError> {
    let mut requirements = self.recipe.requirements.select(&self.options, self.tool_major)?;

    for requirement in &mut requirements {
      if let Some(options) = self.dependency_options.get(&requirement.name) {
        requirement.options = options.clone();
      }
    }

    for dep in self.dependency_options.keys() {
      if !requirements.iter().any(|r| &r.name == dep) {
        debug!(dependency = %dep, "dropping options for dependency that is not required");
      }
    }

    Ok(requirements)
  }

  pub fn resolve(&self) -> Result<Resolution, ConfigurationError> {
    let requirements = self.requirements()?;
    let copy_plan = CopyPlan::build(&requirements, self.graph.as_ref(), self.settings.os, &self.layout);

    info!(
      recipe = %self.recipe.name,
      settings = %self.settings,
      requirements = requirements.len(),
      copies = copy_plan.len(),
      "resolved configuration"
    );

    Ok(Resolution {
      settings: self.settings,
      tool_major: self.tool_major,
      options: self.options.clone(),
      requirements,
      variables: self.variables().clone(),
      copy_plan,
    })
  }
}

/// Resolve the built-in `fea_libs` recipe.
pub fn resolve(settings: Settings, raw: &RawOptions, tool_major: u32) -> Result<Resolution, ConfigurationError> {
  let recipe = Recipe::fea_libs();
  ResolveContext::new(&recipe, settings, raw, tool_major)?.resolve()
}
