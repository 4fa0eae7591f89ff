mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;
use pkgplan_lib::consts::DEFAULT_TOOL_MAJOR;
use pkgplan_lib::copy::CopyPhase;

/// pkgplan - Resolve package recipes into build plans
#[derive(Parser)]
#[command(name = "pkgplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve options, requirements, variables and the copy plan
  Resolve {
    #[command(flatten)]
    target: TargetArgs,

    /// Dependency cache laid out as <root>/<name>/<version>/bin
    #[arg(long)]
    cache: Option<PathBuf>,
  },

  /// Execute one phase of the copy plan
  Stage {
    #[command(flatten)]
    target: TargetArgs,

    /// Phase to execute
    #[arg(long, value_enum, default_value_t = PhaseArg::Staging)]
    phase: PhaseArg,

    /// Dependency cache laid out as <root>/<name>/<version>/bin (required for staging)
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Build directory, binaries are staged into <build-dir>/bin
    #[arg(long, default_value = "build")]
    build_dir: PathBuf,

    /// Package directory, symbols are moved into <package-dir>/bin
    #[arg(long, default_value = "package")]
    package_dir: PathBuf,
  },

  /// Show the recipe
  Recipe {
    /// Recipe file (JSON). The built-in fea_libs recipe is used if omitted
    #[arg(long)]
    recipe: Option<PathBuf>,
  },
}

/// Target environment and option overrides shared by resolving commands.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
  /// Recipe file (JSON). The built-in fea_libs recipe is used if omitted
  #[arg(long)]
  pub recipe: Option<PathBuf>,

  /// Target operating system (defaults to the host)
  #[arg(long)]
  pub os: Option<String>,

  /// Target architecture (defaults to the host)
  #[arg(long)]
  pub arch: Option<String>,

  /// Compiler (defaults to the platform's usual compiler)
  #[arg(long)]
  pub compiler: Option<String>,

  /// Build type
  #[arg(long)]
  pub build_type: Option<String>,

  /// Option override, name=value or dependency:name=value (repeatable)
  #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
  pub options: Vec<String>,

  /// Major version of the dependency manager
  #[arg(long, default_value_t = DEFAULT_TOOL_MAJOR)]
  pub tool_major: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PhaseArg {
  Staging,
  Package,
}

impl From<PhaseArg> for CopyPhase {
  fn from(phase: PhaseArg) -> Self {
    match phase {
      PhaseArg::Staging => CopyPhase::Staging,
      PhaseArg::Package => CopyPhase::Package,
    }
  }
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    output::print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Resolve { target, cache } => cmd::cmd_resolve(&target, cache.as_deref(), cli.output),
    Commands::Stage {
      target,
      phase,
      cache,
      build_dir,
      package_dir,
    } => cmd::cmd_stage(&target, phase.into(), cache.as_deref(), &build_dir, &package_dir, cli.output),
    Commands::Recipe { recipe } => cmd::cmd_recipe(recipe.as_deref(), cli.output),
  }
}
