//! Properties that hold for every settings and option combination.

use pkgplan_lib::options::{OptionValue, RawOptions};
use pkgplan_lib::platform::arch::Arch;
use pkgplan_lib::platform::os::Os;
use pkgplan_lib::platform::{BuildType, Compiler, Settings};
use pkgplan_lib::requirement::RequirementTag;
use pkgplan_lib::util::hash::Hashable;
use pkgplan_lib::{Resolution, resolve};
use proptest::prelude::*;

fn os_strategy() -> impl Strategy<Value = Os> {
  prop_oneof![Just(Os::Linux), Just(Os::MacOs), Just(Os::Windows)]
}

fn settings_strategy() -> impl Strategy<Value = Settings> {
  (
    os_strategy(),
    prop_oneof![
      Just(Compiler::Msvc),
      Just(Compiler::Gcc),
      Just(Compiler::Clang),
      Just(Compiler::AppleClang)
    ],
    prop_oneof![
      Just(BuildType::Debug),
      Just(BuildType::Release),
      Just(BuildType::RelWithDebInfo),
      Just(BuildType::MinSizeRel)
    ],
    prop_oneof![Just(Arch::X86), Just(Arch::X86_64), Just(Arch::Aarch64)],
  )
    .prop_map(|(os, compiler, build_type, arch)| Settings::new(os, compiler, build_type, arch))
}

#[derive(Debug, Clone, Copy)]
struct Flags {
  fpic: bool,
  with_tbb: bool,
  with_onetbb: bool,
  with_date: bool,
}

fn flags_strategy() -> impl Strategy<Value = Flags> {
  (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(fpic, with_tbb, with_onetbb, with_date)| {
    Flags {
      fpic,
      with_tbb,
      with_onetbb,
      with_date,
    }
  })
}

fn raw(flags: Flags) -> RawOptions {
  RawOptions::new()
    .set("fPIC", flags.fpic)
    .set("with_tbb", flags.with_tbb)
    .set("with_onetbb", flags.with_onetbb)
    .set("with_date", flags.with_date)
}

fn threading(resolution: &Resolution) -> Vec<&str> {
  resolution
    .requirements
    .iter()
    .map(|r| r.name.as_str())
    .filter(|name| *name == "tbb" || *name == "onetbb")
    .collect()
}

proptest! {
  #[test]
  fn fpic_absent_on_windows_and_unchanged_elsewhere(settings in settings_strategy(), flags in flags_strategy()) {
    let resolution = resolve(settings, &raw(flags), 2).unwrap();

    if settings.os == Os::Windows {
      prop_assert!(!resolution.options.contains("fPIC"));
    } else {
      prop_assert_eq!(resolution.options.get("fPIC"), Some(&OptionValue::Bool(flags.fpic)));
    }
  }

  #[test]
  fn at_most_one_threading_backend(settings in settings_strategy(), flags in flags_strategy()) {
    let resolution = resolve(settings, &raw(flags), 2).unwrap();
    let expected: Vec<&str> = match (flags.with_onetbb, flags.with_tbb) {
      (true, _) => vec!["onetbb"],
      (false, true) => vec!["tbb"],
      (false, false) => vec![],
    };

    prop_assert_eq!(threading(&resolution), expected);
  }

  #[test]
  fn date_follows_its_toggle(settings in settings_strategy(), flags in flags_strategy()) {
    let resolution = resolve(settings, &raw(flags), 2).unwrap();
    prop_assert_eq!(resolution.requirement("date").is_some(), flags.with_date);
  }

  #[test]
  fn resolution_is_idempotent(settings in settings_strategy(), flags in flags_strategy(), major in 0u32..4) {
    let a = resolve(settings, &raw(flags), major).unwrap();
    let b = resolve(settings, &raw(flags), major).unwrap();

    prop_assert_eq!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
    prop_assert_eq!(a, b);
  }

  #[test]
  fn gtest_tag_tracks_tool_major(settings in settings_strategy(), major in 0u32..6) {
    let resolution = resolve(settings, &RawOptions::new(), major).unwrap();
    let gtest = resolution.requirement("gtest").unwrap();

    let expected = if major < 2 { RequirementTag::Private } else { RequirementTag::TestOnly };
    prop_assert_eq!(gtest.tag, Some(expected));
    prop_assert_eq!(gtest.version.as_str(), "1.11.0");
  }

  #[test]
  fn every_staging_copy_targets_local_bin(settings in settings_strategy(), flags in flags_strategy()) {
    let resolution = resolve(settings, &raw(flags), 2).unwrap();

    prop_assert!(resolution.copy_plan.staging.iter().all(|op| op.dst == std::path::Path::new("build/bin")));
    prop_assert_eq!(resolution.copy_plan.package.len(), 1);
  }
}
