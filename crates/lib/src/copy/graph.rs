use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::requirement::Requirement;

/// Answers where a resolved dependency keeps its runtime binaries.
///
/// Returning `None` means the dependency ships no runtime binaries and
/// contributes nothing to the staging phase.
pub trait DependencyGraph {
  fn bin_dir(&self, requirement: &Requirement) -> Option<PathBuf>;
}

impl<T: DependencyGraph + ?Sized> DependencyGraph for &T {
  fn bin_dir(&self, requirement: &Requirement) -> Option<PathBuf> {
    (**self).bin_dir(requirement)
  }
}

/// Binary directories given explicitly by dependency name.
#[derive(Debug, Clone, Default)]
pub struct StaticGraph {
  dirs: BTreeMap<String, PathBuf>,
}

impl StaticGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: &str, bin_dir: impl Into<PathBuf>) {
    self.dirs.insert(name.to_string(), bin_dir.into());
  }
}

impl DependencyGraph for StaticGraph {
  fn bin_dir(&self, requirement: &Requirement) -> Option<PathBuf> {
    self.dirs.get(&requirement.name).cloned()
  }
}

/// A dependency cache laid out as `<root>/<name>/<version>/bin`.
#[derive(Debug, Clone)]
pub struct DependencyCache {
  root: PathBuf,
  require_existing: bool,
}

impl DependencyCache {
  /// A cache on disk. Only directories that exist are reported.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      require_existing: true,
    }
  }

  /// Relative `<name>/<version>/bin` paths, reported without looking at the
  /// filesystem.
  pub fn symbolic() -> Self {
    Self {
      root: PathBuf::new(),
      require_existing: false,
    }
  }
}

impl DependencyGraph for DependencyCache {
  fn bin_dir(&self, requirement: &Requirement) -> Option<PathBuf> {
    let dir = self.root.join(&requirement.name).join(&requirement.version).join("bin");
    if self.require_existing && !dir.is_dir() {
      return None;
    }
    Some(dir)
  }
}
