use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::graph::DependencyGraph;
use crate::platform::os::Os;
use crate::requirement::Requirement;

/// Copy the files under `src` whose name matches `pattern` into `dst`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CopyOp {
  pub pattern: String,
  pub src: PathBuf,
  pub dst: PathBuf,
  /// Match file names without regard to case, as Windows file systems do.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub ignore_case: bool,
}

impl CopyOp {
  pub fn new(pattern: &str, src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
    Self {
      pattern: pattern.to_string(),
      src: src.into(),
      dst: dst.into(),
      ignore_case: false,
    }
  }

  pub fn ignoring_case(mut self, ignore_case: bool) -> Self {
    self.ignore_case = ignore_case;
    self
  }
}

impl fmt::Display for CopyOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} -> {}", self.pattern, self.src.display(), self.dst.display())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyPhase {
  /// Runtime binaries and symbols of dependencies, after the build.
  Staging,
  /// Debug symbols of the package itself, after packaging.
  Package,
}

impl CopyPhase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Staging => "staging",
      Self::Package => "package",
    }
  }
}

impl fmt::Display for CopyPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// File name patterns of the artifacts a platform produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactPatterns {
  pub dynamic_libraries: &'static [&'static str],
  pub debug_symbols: &'static str,
}

impl ArtifactPatterns {
  pub fn for_os(os: Os) -> Self {
    match os {
      Os::Windows => Self {
        dynamic_libraries: &["*.dll"],
        debug_symbols: "*.pdb",
      },
      Os::MacOs => Self {
        dynamic_libraries: &["*.dylib"],
        debug_symbols: "*.dSYM",
      },
      Os::Linux => Self {
        dynamic_libraries: &["*.so", "*.so.*"],
        debug_symbols: "*.debug",
      },
    }
  }
}

/// Destination directories for copied artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
  /// The consuming project's local binary output directory.
  pub build_bin: PathBuf,
  /// Binary directory of the final package.
  pub package_bin: PathBuf,
}

impl Layout {
  pub fn new(build_dir: &Path, package_dir: &Path) -> Self {
    Self {
      build_bin: build_dir.join("bin"),
      package_bin: package_dir.join("bin"),
    }
  }
}

impl Default for Layout {
  fn default() -> Self {
    Self::new(Path::new("build"), Path::new("package"))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPlan {
  pub staging: Vec<CopyOp>,
  pub package: Vec<CopyOp>,
}

impl CopyPlan {
  /// Build the plan for `requirements`, in requirement order.
  ///
  /// Each requirement the graph reports a binary directory for contributes its
  /// dynamic libraries, then its debug symbols, to the staging phase. The
  /// package phase moves the package's own debug symbols.
  pub fn build(requirements: &[Requirement], graph: &dyn DependencyGraph, os: Os, layout: &Layout) -> Self {
    let patterns = ArtifactPatterns::for_os(os);
    let ignore_case = os == Os::Windows;
    let mut staging = Vec::new();

    for requirement in requirements {
      let Some(bin_dir) = graph.bin_dir(requirement) else {
        continue;
      };
      for pattern in patterns.dynamic_libraries {
        staging.push(CopyOp::new(pattern, &bin_dir, &layout.build_bin).ignoring_case(ignore_case));
      }
      staging.push(CopyOp::new(patterns.debug_symbols, &bin_dir, &layout.build_bin).ignoring_case(ignore_case));
    }

    let package =
      vec![CopyOp::new(patterns.debug_symbols, &layout.build_bin, &layout.package_bin).ignoring_case(ignore_case)];

    Self { staging, package }
  }

  pub fn phase(&self, phase: CopyPhase) -> &[CopyOp] {
    match phase {
      CopyPhase::Staging => &self.staging,
      CopyPhase::Package => &self.package,
    }
  }

  pub fn len(&self) -> usize {
    self.staging.len() + self.package.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
