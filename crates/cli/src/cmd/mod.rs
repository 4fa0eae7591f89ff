mod recipe;
mod resolve;
mod stage;

pub use recipe::cmd_recipe;
pub use resolve::cmd_resolve;
pub use stage::cmd_stage;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use pkgplan_lib::options::RawOptions;
use pkgplan_lib::platform::arch::Arch;
use pkgplan_lib::platform::os::Os;
use pkgplan_lib::platform::{BuildType, Compiler, Settings};
use pkgplan_lib::recipe::Recipe;

use crate::TargetArgs;

/// Load the recipe from `path`, or the built-in one.
pub(crate) fn load_recipe(path: Option<&Path>) -> Result<Recipe> {
  match path {
    Some(path) => Recipe::from_file(path).with_context(|| format!("Failed to load recipe: {}", path.display())),
    None => Ok(Recipe::fea_libs()),
  }
}

/// Host settings with each field replaced by its flag when given.
pub(crate) fn target_settings(args: &TargetArgs) -> Result<Settings> {
  let host = Settings::detect();

  let os = match &args.os {
    Some(os) => os.parse::<Os>()?,
    None => host.map(|s| s.os).context("Could not detect host OS, pass --os")?,
  };
  let arch = match &args.arch {
    Some(arch) => arch.parse::<Arch>()?,
    None => host.map(|s| s.arch).context("Could not detect host architecture, pass --arch")?,
  };
  let compiler = match &args.compiler {
    Some(compiler) => compiler.parse::<Compiler>()?,
    None => Compiler::default_for(os),
  };
  let build_type = match &args.build_type {
    Some(build_type) => build_type.parse::<BuildType>()?,
    None => BuildType::default(),
  };

  let settings = Settings::new(os, compiler, build_type, arch);
  debug!(%settings, "target settings");
  Ok(settings)
}

pub(crate) fn raw_options(args: &TargetArgs) -> Result<RawOptions> {
  RawOptions::from_overrides(&args.options).context("Invalid option override")
}
