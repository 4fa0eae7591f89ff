//! Target platform and the settings snapshot a recipe is resolved against.
//!
//! The settings are supplied by the build environment and never change during
//! a resolution. [`Settings::detect`] fills them from the host for callers that
//! do not specify a target.

pub mod arch;
pub mod os;
mod settings;

use std::fmt;

use arch::Arch;
use os::Os;

pub use settings::{BuildType, Compiler, Settings};

/// Platform identifier combining architecture and OS (e.g., "x86_64-windows")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  /// Create a new platform identifier
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Returns the platform triple string (e.g., "aarch64-macos")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// Returns the platform triple for the current system (e.g., "x86_64-linux")
///
/// Returns `None` if the current platform is not supported
pub fn platform_triple() -> Option<String> {
  Platform::current().map(|p| p.triple())
}
