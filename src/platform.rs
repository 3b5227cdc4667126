//! Platform resolution and per-platform installation knobs.
//!
//! The platform is resolved exactly once, before any network or filesystem
//! activity, and every later stage that branches on it (archive codec,
//! executable suffix, PATH registration) selects its behavior from this one
//! descriptor instead of re-testing the OS.

use crate::error::InstallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::MacOs => "darwin",
            Os::Windows => "windows",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X8664,
    Aarch64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X8664 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

/// Canonical (os, arch) pair for the executing machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Detect the current platform from the compile-time identifiers.
    pub fn detect() -> Result<Self, InstallError> {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map raw OS/arch identifiers into the supported set.
    ///
    /// Alias spellings normalize to one canonical form: `darwin`/`macos`,
    /// `amd64`→`x86_64`, `arm64`→`aarch64`. Anything else is rejected.
    pub fn from_raw(raw_os: &str, raw_arch: &str) -> Result<Self, InstallError> {
        let os = match raw_os {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::MacOs,
            "windows" => Os::Windows,
            _ => return Err(unsupported(raw_os, raw_arch)),
        };
        let arch = match raw_arch {
            "x86_64" | "amd64" => Arch::X8664,
            "aarch64" | "arm64" => Arch::Aarch64,
            _ => return Err(unsupported(raw_os, raw_arch)),
        };
        Ok(Self { os, arch })
    }

    /// Canonical `{os}-{arch}` string used in artifact names.
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.os.as_str(), self.arch.as_str())
    }

    /// Archive extension for this platform's release artifacts.
    pub fn archive_ext(&self) -> &'static str {
        match self.os {
            Os::Windows => "zip",
            Os::Linux | Os::MacOs => "tar.gz",
        }
    }

    /// Executable file name for a given base name.
    pub fn exe_name(&self, base: &str) -> String {
        match self.os {
            Os::Windows => format!("{base}.exe"),
            Os::Linux | Os::MacOs => base.to_string(),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }
}

fn unsupported(os: &str, arch: &str) -> InstallError {
    InstallError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    }
}
