//! Best-effort execution of copy operations.
//!
//! A copy walks its source directory recursively and copies every entry whose
//! file name matches the pattern, keeping its path relative to the source. A
//! matching directory (such as a `.dSYM` bundle) is copied whole. A missing
//! source directory or a pattern that matches nothing copies nothing. A
//! destination that is the source, or lies inside it, is refused before
//! anything is written.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::plan::{CopyOp, CopyPhase, CopyPlan};

#[derive(Debug, Error)]
pub enum CopyError {
  #[error("invalid pattern '{pattern}': {message}")]
  Pattern { pattern: String, message: String },

  #[error("copy destination {dst} overlaps source {src}")]
  Overlap { src: String, dst: String },

  #[error("failed to walk {path}: {message}")]
  Walk { path: String, message: String },

  #[error("failed to copy {from} to {to}: {source}")]
  Io {
    from: String,
    to: String,
    #[source]
    source: io::Error,
  },
}

/// Execute one copy operation.
///
/// Relative `src` and `dst` paths are taken relative to `base`. Returns the
/// destination paths of the copied files.
pub fn execute(op: &CopyOp, base: &Path) -> Result<Vec<PathBuf>, CopyError> {
  let pattern = Pattern::new(&op.pattern).map_err(|e| CopyError::Pattern {
    pattern: op.pattern.clone(),
    message: e.to_string(),
  })?;
  let src = base.join(&op.src);
  let dst = base.join(&op.dst);

  if !src.is_dir() {
    debug!(src = ?src, "copy source does not exist, skipping");
    return Ok(Vec::new());
  }

  let real_src = canonical(&src);
  if canonical(&dst).starts_with(&real_src) {
    return Err(CopyError::Overlap {
      src: src.display().to_string(),
      dst: dst.display().to_string(),
    });
  }

  let options = MatchOptions {
    case_sensitive: !op.ignore_case,
    ..MatchOptions::new()
  };
  let mut copied = Vec::new();
  let mut walker = WalkDir::new(&src).min_depth(1).sort_by_file_name().into_iter();

  while let Some(entry) = walker.next() {
    let entry = entry.map_err(|e| CopyError::Walk {
      path: src.display().to_string(),
      message: e.to_string(),
    })?;

    let matches = entry.file_name().to_str().map(|name| pattern.matches_with(name, options)).unwrap_or(false);
    if !matches {
      continue;
    }

    let rel = entry.path().strip_prefix(&src).unwrap_or(entry.path());
    let target = dst.join(rel);

    if entry.file_type().is_dir() {
      copy_tree(entry.path(), &target, &mut copied)?;
      walker.skip_current_dir();
    } else {
      copy_file(entry.path(), &target)?;
      copied.push(target);
    }
  }

  debug!(op = %op, count = copied.len(), "copy finished");
  Ok(copied)
}

/// Execute every operation of one phase, in plan order.
pub fn execute_phase(plan: &CopyPlan, phase: CopyPhase, base: &Path) -> Result<Vec<PathBuf>, CopyError> {
  let mut copied = Vec::new();
  for op in plan.phase(phase) {
    copied.extend(execute(op, base)?);
  }
  info!(%phase, count = copied.len(), "copy phase finished");
  Ok(copied)
}

/// `path` with symlinks and `..` resolved, as far as it exists on disk.
fn canonical(path: &Path) -> PathBuf {
  let mut normal = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        normal.pop();
      }
      other => normal.push(other),
    }
  }

  let mut existing = normal.as_path();
  let mut missing = Vec::new();
  while !existing.exists() {
    match (existing.parent(), existing.file_name()) {
      (Some(parent), Some(name)) => {
        missing.push(name);
        existing = parent;
      }
      _ => return normal,
    }
  }

  let mut resolved = fs::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
  resolved.extend(missing.iter().rev());
  resolved
}

fn copy_file(from: &Path, to: &Path) -> Result<(), CopyError> {
  let io_err = |source: io::Error| CopyError::Io {
    from: from.display().to_string(),
    to: to.display().to_string(),
    source,
  };

  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  fs::copy(from, to).map_err(io_err)?;
  Ok(())
}

fn copy_tree(from: &Path, to: &Path, copied: &mut Vec<PathBuf>) -> Result<(), CopyError> {
  for entry in WalkDir::new(from).sort_by_file_name() {
    let entry = entry.map_err(|e| CopyError::Walk {
      path: from.display().to_string(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let rel = entry.path().strip_prefix(from).unwrap_or(entry.path());
    let target = to.join(rel);
    copy_file(entry.path(), &target)?;
    copied.push(target);
  }
  Ok(())
}
