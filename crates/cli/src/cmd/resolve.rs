//! Implementation of the `pkgplan resolve` command.
//!
//! Resolves the recipe for the requested target and prints the resulting
//! plan. Nothing is built or copied.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use pkgplan_lib::copy::{CopyOp, DependencyCache};
use pkgplan_lib::recipe::Recipe;
use pkgplan_lib::util::hash::Hashable;
use pkgplan_lib::{Resolution, ResolveContext};

use super::{load_recipe, raw_options, target_settings};
use crate::TargetArgs;
use crate::output::{
  OutputFormat, print_entry, print_heading, print_json, print_stat, print_success, symbols, truncate_hash,
};

#[derive(Serialize)]
struct ResolveOutput<'a> {
  recipe: String,
  hash: String,
  #[serde(flatten)]
  resolution: &'a Resolution,
  configure: Vec<String>,
}

pub fn cmd_resolve(args: &TargetArgs, cache: Option<&Path>, format: OutputFormat) -> Result<()> {
  let recipe = load_recipe(args.recipe.as_deref())?;
  let settings = target_settings(args)?;
  let raw = raw_options(args)?;

  let mut ctx =
    ResolveContext::new(&recipe, settings, &raw, args.tool_major).context("Failed to resolve configuration")?;
  if let Some(cache) = cache {
    ctx = ctx.with_graph(DependencyCache::new(cache));
  }

  let resolution = ctx.resolve().context("Failed to resolve configuration")?;
  let hash = resolution.compute_hash().context("Failed to compute resolution hash")?;
  let configure = ctx.build_tool().configure_args(Path::new("."), Path::new("build"));

  if format.is_json() {
    return print_json(&ResolveOutput {
      recipe: format!("{}/{}", recipe.name, recipe.version),
      hash: hash.0,
      resolution: &resolution,
      configure,
    });
  }

  print_success(&format!(
    "Resolved {}/{} ({})",
    recipe.name,
    recipe.version,
    truncate_hash(&hash.0)
  ));
  print_stat("Settings", &resolution.settings.to_string());
  print_stat("Tool major", &resolution.tool_major.to_string());

  print_options(&recipe, &resolution);

  print_heading("Requirements:");
  for requirement in &resolution.requirements {
    let options: Vec<String> = requirement.options.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    if options.is_empty() {
      print_entry(true, &requirement.to_string());
    } else {
      print_entry(true, &format!("{} [{}]", requirement, options.join(", ")));
    }
  }

  print_heading("Variables:");
  for (name, value) in resolution.variables.iter() {
    println!("  {}={}", name, value.render());
  }

  print_copies("Copy plan (staging):", &resolution.copy_plan.staging);
  print_copies("Copy plan (package):", &resolution.copy_plan.package);

  print_heading("Configure:");
  println!("  {} {}", ctx.build_tool().program, configure.join(" "));

  Ok(())
}

fn print_options(recipe: &Recipe, resolution: &Resolution) {
  print_heading("Options:");
  for decl in &recipe.options {
    match resolution.options.get(&decl.name) {
      Some(value) => print_entry(true, &format!("{}={}", decl.name, value)),
      None => print_entry(false, &format!("{} (removed for {})", decl.name, resolution.settings.os)),
    }
  }
}

fn print_copies(title: &str, ops: &[CopyOp]) {
  print_heading(title);
  for op in ops {
    println!(
      "  {} {} {} {}",
      op.pattern,
      op.src.display(),
      symbols::ARROW,
      op.dst.display()
    );
  }
}
