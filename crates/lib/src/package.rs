//! Information about a built package.

use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

const LIBRARY_SUFFIXES: &[&str] = &[".lib", ".a", ".so", ".dylib"];

/// Library names found directly in `<package_dir>/lib`, as a linker expects them.
///
/// The `lib` prefix and the library suffix are stripped, so `libfea.a` and
/// `fea.lib` both yield `fea`. A missing `lib` directory yields nothing.
pub fn collect_libs(package_dir: &Path) -> Vec<String> {
  let lib_dir = package_dir.join("lib");
  let mut names = BTreeSet::new();

  for entry in WalkDir::new(&lib_dir).max_depth(1).into_iter().filter_map(Result::ok) {
    if !entry.file_type().is_file() {
      continue;
    }
    let Some(file_name) = entry.file_name().to_str() else {
      continue;
    };
    if let Some(name) = library_name(file_name) {
      names.insert(name.to_string());
    }
  }

  names.into_iter().collect()
}

fn library_name(file_name: &str) -> Option<&str> {
  let stem = LIBRARY_SUFFIXES.iter().find_map(|suffix| file_name.strip_suffix(suffix))?;
  let name = stem.strip_prefix("lib").unwrap_or(stem);
  (!name.is_empty()).then_some(name)
}
