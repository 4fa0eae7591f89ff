//! Implementation of the `pkgplan stage` command.
//!
//! Resolves the recipe, then executes one phase of the copy plan against the
//! given directories. Resolution errors abort before anything is copied, as
//! does a build directory that is also the package directory.

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use serde::Serialize;

use pkgplan_lib::ResolveContext;
use pkgplan_lib::copy::execute::execute_phase;
use pkgplan_lib::copy::{CopyPhase, DependencyCache, Layout, StaticGraph};
use pkgplan_lib::package::collect_libs;

use super::{load_recipe, raw_options, target_settings};
use crate::TargetArgs;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct StageOutput {
  phase: CopyPhase,
  copied: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  libs: Vec<String>,
}

pub fn cmd_stage(
  args: &TargetArgs,
  phase: CopyPhase,
  cache: Option<&Path>,
  build_dir: &Path,
  package_dir: &Path,
  format: OutputFormat,
) -> Result<()> {
  let layout = Layout::new(build_dir, package_dir);
  ensure!(
    layout.build_bin != layout.package_bin,
    "Build directory and package directory must differ: {}",
    build_dir.display()
  );

  let recipe = load_recipe(args.recipe.as_deref())?;
  let settings = target_settings(args)?;
  let raw = raw_options(args)?;

  let ctx = ResolveContext::new(&recipe, settings, &raw, args.tool_major)
    .context("Failed to resolve configuration")?
    .with_layout(layout);
  let ctx = match (cache, phase) {
    (Some(cache), _) => ctx.with_graph(DependencyCache::new(cache)),
    (None, CopyPhase::Package) => ctx.with_graph(StaticGraph::new()),
    (None, CopyPhase::Staging) => bail!("The staging phase needs a dependency cache, pass --cache"),
  };
  let resolution = ctx.resolve().context("Failed to resolve configuration")?;

  let cwd = std::env::current_dir().context("Failed to read current directory")?;
  let copied = execute_phase(&resolution.copy_plan, phase, &cwd)
    .with_context(|| format!("Failed to execute {} copy phase", phase))?;

  let libs = match phase {
    CopyPhase::Package => collect_libs(&cwd.join(package_dir)),
    CopyPhase::Staging => Vec::new(),
  };

  if format.is_json() {
    return print_json(&StageOutput {
      phase,
      copied: copied.iter().map(|p| p.display().to_string()).collect(),
      libs,
    });
  }

  for path in &copied {
    print_info(&path.display().to_string());
  }
  print_success(&format!("Copied {} file(s) in {} phase", copied.len(), phase));
  if !libs.is_empty() {
    print_stat("Libraries", &libs.join(", "));
  }
  Ok(())
}
