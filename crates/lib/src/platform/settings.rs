use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Platform;
use super::arch::Arch;
use super::os::Os;
use crate::error::ConfigurationError;

/// Compiler family the package is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
  Msvc,
  Gcc,
  Clang,
  AppleClang,
}

impl Compiler {
  /// The compiler a platform builds with when none is specified.
  pub fn default_for(os: Os) -> Self {
    match os {
      Os::Windows => Self::Msvc,
      Os::MacOs => Self::AppleClang,
      Os::Linux => Self::Gcc,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Msvc => "msvc",
      Self::Gcc => "gcc",
      Self::Clang => "clang",
      Self::AppleClang => "apple-clang",
    }
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Compiler {
  type Err = ConfigurationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "msvc" | "visual studio" => Ok(Self::Msvc),
      "gcc" => Ok(Self::Gcc),
      "clang" => Ok(Self::Clang),
      "apple-clang" | "apple_clang" | "appleclang" => Ok(Self::AppleClang),
      _ => Err(ConfigurationError::InvalidSetting {
        setting: "compiler",
        value: s.to_string(),
      }),
    }
  }
}

/// Build configuration, passed to the build tool verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
  Debug,
  #[default]
  Release,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = ConfigurationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "debug" => Ok(Self::Debug),
      "release" => Ok(Self::Release),
      "relwithdebinfo" => Ok(Self::RelWithDebInfo),
      "minsizerel" => Ok(Self::MinSizeRel),
      _ => Err(ConfigurationError::InvalidSetting {
        setting: "build_type",
        value: s.to_string(),
      }),
    }
  }
}

/// Immutable snapshot of the build environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
  pub os: Os,
  pub compiler: Compiler,
  pub build_type: BuildType,
  pub arch: Arch,
}

impl Settings {
  pub fn new(os: Os, compiler: Compiler, build_type: BuildType, arch: Arch) -> Self {
    Self {
      os,
      compiler,
      build_type,
      arch,
    }
  }

  /// Settings for `os`/`arch` with the platform's default compiler and a
  /// release build.
  pub fn for_platform(os: Os, arch: Arch) -> Self {
    Self::new(os, Compiler::default_for(os), BuildType::default(), arch)
  }

  /// Detect settings for the host.
  ///
  /// Returns `None` if the host OS or architecture is not supported
  pub fn detect() -> Option<Self> {
    let platform = Platform::current()?;
    Some(Self::for_platform(platform.os, platform.arch))
  }

  pub fn platform(&self) -> Platform {
    Platform::new(self.arch, self.os)
  }
}

impl fmt::Display for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "os={} compiler={} build_type={} arch={}",
      self.os, self.compiler, self.build_type, self.arch
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_compiler_follows_os() {
    assert_eq!(Compiler::default_for(Os::Windows), Compiler::Msvc);
    assert_eq!(Compiler::default_for(Os::MacOs), Compiler::AppleClang);
    assert_eq!(Compiler::default_for(Os::Linux), Compiler::Gcc);
  }

  #[test]
  fn build_type_parse_is_case_insensitive() {
    assert_eq!("RELEASE".parse::<BuildType>().unwrap(), BuildType::Release);
    assert_eq!("RelWithDebInfo".parse::<BuildType>().unwrap(), BuildType::RelWithDebInfo);
    assert!("fast".parse::<BuildType>().is_err());
  }

  #[test]
  fn detect_matches_host_platform() {
    let settings = Settings::detect().expect("host platform should be supported");
    assert_eq!(Some(settings.platform()), Platform::current());
    assert_eq!(settings.build_type, BuildType::Release);
  }
}
