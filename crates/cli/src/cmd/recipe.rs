use std::path::Path;

use anyhow::Result;

use pkgplan_lib::options::OptionKind;
use pkgplan_lib::platform::platform_triple;
use pkgplan_lib::rules::Predicate;

use super::load_recipe;
use crate::output::{OutputFormat, print_heading, print_json, print_stat};

pub fn cmd_recipe(path: Option<&Path>, format: OutputFormat) -> Result<()> {
  let recipe = load_recipe(path)?;

  if format.is_json() {
    return print_json(&recipe);
  }

  print_heading(&format!("{}/{}", recipe.name, recipe.version));
  if !recipe.description.is_empty() {
    print_stat("Description", &recipe.description);
  }
  if let Some(license) = &recipe.license {
    print_stat("License", license);
  }
  if let Some(url) = &recipe.url {
    print_stat("Url", url);
  }
  if !recipe.topics.is_empty() {
    print_stat("Topics", &recipe.topics.join(", "));
  }
  print_stat("Host", platform_triple().as_deref().unwrap_or("unsupported"));

  print_heading("Options:");
  for decl in &recipe.options {
    let kind = match &decl.kind {
      OptionKind::Bool => "bool".to_string(),
      OptionKind::Choice(values) => values.join("|"),
    };
    let mut line = format!("  {} ({}, default {})", decl.name, kind, decl.default);
    if !decl.removed_on.is_empty() {
      let removed: Vec<String> = decl.removed_on.iter().map(|os| os.to_string()).collect();
      line.push_str(&format!(", removed on {}", removed.join(", ")));
    }
    println!("{}", line);
  }

  print_heading("Requirements:");
  for rule in recipe.requirements.rules() {
    let when = match &rule.predicate {
      Predicate::Always => "always".to_string(),
      Predicate::Enabled { option } => format!("if {}", option),
    };
    match &rule.group {
      Some(group) => println!("  {}/{} ({}, group {})", rule.name, rule.version, when, group),
      None => println!("  {}/{} ({})", rule.name, rule.version, when),
    }
  }

  Ok(())
}
