//! CLI smoke tests for pkgplan.
//!
//! These tests run the binary end to end and check exit codes and the shape
//! of its output.

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the pkgplan binary.
fn pkgplan_cmd() -> Command {
  cargo_bin_cmd!("pkgplan")
}

fn resolve_json(args: &[&str]) -> serde_json::Value {
  let output = pkgplan_cmd()
    .args(["--output", "json", "resolve"])
    .args(args)
    .output()
    .unwrap();
  assert!(output.status.success(), "resolve failed: {}", String::from_utf8_lossy(&output.stderr));
  serde_json::from_slice(&output.stdout).unwrap()
}

fn touch(root: &Path, rel: &str) {
  let path = root.join(rel);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, rel).unwrap();
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  pkgplan_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  pkgplan_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("pkgplan"));
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_text_lists_plan_sections() {
  pkgplan_cmd()
    .args(["resolve", "--os", "linux", "--arch", "x86_64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Resolved fea_libs/1.0.0"))
    .stdout(predicate::str::contains("gtest/1.11.0 (test)"))
    .stdout(predicate::str::contains("FEA_PULL_CONAN=OFF"))
    .stdout(predicate::str::contains("-DCMAKE_POSITION_INDEPENDENT_CODE=ON"));
}

#[test]
fn resolve_windows_example() {
  let json = resolve_json(&[
    "--os",
    "Windows",
    "--arch",
    "x86_64",
    "-o",
    "fPIC=True",
    "-o",
    "with_tbb=True",
    "-o",
    "with_onetbb=False",
    "-o",
    "with_date=True",
  ]);

  assert!(json["options"].get("fPIC").is_none());
  let names: Vec<&str> = json["requirements"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["gtest", "date", "tbb"]);
  assert_eq!(json["requirements"][0]["tag"], "test_only");
  assert_eq!(json["variables"]["FEA_WITH_TBB"], true);
  assert_eq!(json["variables"]["FEA_WITH_ONETBB"], false);
  assert_eq!(json["variables"]["FEA_WITH_DATE"], true);
  assert_eq!(json["copy_plan"]["staging"][0]["pattern"], "*.dll");
}

#[test]
fn resolve_old_tool_tags_gtest_private() {
  let json = resolve_json(&["--os", "linux", "--arch", "x86_64", "--tool-major", "1", "-o", "with_tbb=true"]);

  assert_eq!(json["requirements"][0]["name"], "gtest");
  assert_eq!(json["requirements"][0]["tag"], "private");
  let names: Vec<&str> = json["requirements"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["name"].as_str().unwrap())
    .collect();
  assert!(names.contains(&"onetbb"));
  assert!(!names.contains(&"tbb"));
}

#[test]
fn resolve_is_deterministic() {
  let args = ["--os", "macos", "--arch", "armv8", "-o", "with_date=false"];
  let a = resolve_json(&args);
  let b = resolve_json(&args);

  assert_eq!(a["hash"], b["hash"]);
  assert_eq!(a, b);
}

#[test]
fn resolve_rejects_unknown_option() {
  pkgplan_cmd()
    .args(["resolve", "--os", "linux", "--arch", "x86_64", "-o", "shared=true"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown option 'shared'"));
}

#[test]
fn resolve_rejects_bad_setting() {
  pkgplan_cmd()
    .args(["resolve", "--os", "plan9"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid os setting 'plan9'"));
}

#[test]
fn resolve_fails_when_recipe_drops_threading_options() {
  let temp = TempDir::new().unwrap();
  let recipe = temp.path().join("recipe.json");
  std::fs::write(
    &recipe,
    r#"{
      "name": "broken",
      "version": "0.1.0",
      "options": [],
      "requirements": [
        { "when": "enabled", "option": "with_onetbb", "name": "onetbb", "version": "2021.3.0", "group": "threading" },
        { "when": "enabled", "option": "with_tbb", "name": "tbb", "version": "2020.3", "group": "threading" }
      ]
    }"#,
  )
  .unwrap();

  pkgplan_cmd()
    .args(["resolve", "--os", "linux", "--arch", "x86_64", "--recipe"])
    .arg(&recipe)
    .assert()
    .failure()
    .stderr(predicate::str::contains("with_onetbb"));
}

// =============================================================================
// stage
// =============================================================================

#[test]
fn stage_copies_dependency_binaries() {
  let temp = TempDir::new().unwrap();
  touch(temp.path(), "cache/onetbb/2021.3.0/bin/tbb12.dll");
  touch(temp.path(), "cache/onetbb/2021.3.0/bin/tbb12.pdb");
  touch(temp.path(), "cache/onetbb/2021.3.0/bin/tbb12.lib");

  pkgplan_cmd()
    .current_dir(temp.path())
    .args(["stage", "--os", "windows", "--arch", "x86_64", "--cache", "cache"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Copied 2 file(s) in staging phase"));

  assert!(temp.path().join("build/bin/tbb12.dll").is_file());
  assert!(temp.path().join("build/bin/tbb12.pdb").is_file());
  assert!(!temp.path().join("build/bin/tbb12.lib").exists());
}

#[test]
fn stage_package_moves_symbols() {
  let temp = TempDir::new().unwrap();
  touch(temp.path(), "build/bin/fea.pdb");
  touch(temp.path(), "package/lib/fea.lib");

  pkgplan_cmd()
    .current_dir(temp.path())
    .args([
      "stage", "--os", "windows", "--arch", "x86_64", "--phase", "package",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Copied 1 file(s) in package phase"))
    .stdout(predicate::str::contains("Libraries: fea"));

  assert!(temp.path().join("package/bin/fea.pdb").is_file());
}

#[test]
fn stage_package_refuses_shared_directory() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir_all(temp.path().join("out/bin")).unwrap();
  std::fs::write(temp.path().join("out/bin/fea.pdb"), "SYMBOLS").unwrap();

  pkgplan_cmd()
    .current_dir(temp.path())
    .args([
      "stage", "--os", "windows", "--arch", "x86_64", "--phase", "package", "--build-dir", "out", "--package-dir",
      "out",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("must differ"));

  assert_eq!(std::fs::read(temp.path().join("out/bin/fea.pdb")).unwrap(), b"SYMBOLS");
}

#[test]
fn stage_staging_requires_cache() {
  let temp = TempDir::new().unwrap();

  pkgplan_cmd()
    .current_dir(temp.path())
    .args(["stage", "--os", "windows", "--arch", "x86_64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--cache"));

  assert!(!temp.path().join("build").exists());
}

#[test]
fn stage_copies_upper_case_windows_binaries() {
  let temp = TempDir::new().unwrap();
  touch(temp.path(), "cache/onetbb/2021.3.0/bin/TBB12.DLL");

  pkgplan_cmd()
    .current_dir(temp.path())
    .args(["stage", "--os", "windows", "--arch", "x86_64", "--cache", "cache"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Copied 1 file(s) in staging phase"));

  assert!(temp.path().join("build/bin/TBB12.DLL").is_file());
}

#[test]
fn stage_does_nothing_when_resolution_fails() {
  let temp = TempDir::new().unwrap();
  touch(temp.path(), "cache/onetbb/2021.3.0/bin/tbb12.dll");

  pkgplan_cmd()
    .current_dir(temp.path())
    .args(["stage", "--os", "windows", "--cache", "cache", "-o", "with_onetbb=maybe"])
    .assert()
    .failure();

  assert!(!temp.path().join("build").exists());
}

// =============================================================================
// recipe
// =============================================================================

#[test]
fn recipe_shows_builtin_metadata() {
  pkgplan_cmd()
    .arg("recipe")
    .assert()
    .success()
    .stdout(predicate::str::contains("fea_libs/1.0.0"))
    .stdout(predicate::str::contains("removed on windows"))
    .stdout(predicate::str::contains("onetbb/2021.3.0 (if with_onetbb, group threading)"));
}

#[test]
fn recipe_json_round_trips_through_file() {
  let output = pkgplan_cmd().args(["--output", "json", "recipe"]).output().unwrap();
  assert!(output.status.success());

  let temp = TempDir::new().unwrap();
  let path = temp.path().join("recipe.json");
  std::fs::write(&path, &output.stdout).unwrap();

  pkgplan_cmd()
    .args(["--output", "json", "recipe", "--recipe"])
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::eq(String::from_utf8(output.stdout).unwrap()));
}
