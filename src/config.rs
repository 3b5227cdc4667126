//! Run configuration, built once at startup and threaded through every stage.
//!
//! No stage reads the environment ad hoc; the single `BB_INSTALL_DIR`
//! override is resolved here, before any network activity.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::InstallError;
use crate::platform::Platform;

/// Release repository the artifacts are published under.
pub const REPO_BASE: &str = "https://github.com/iamngoni/bitbucket-cli";

/// Latest-release metadata endpoint for that repository.
pub const RELEASE_API: &str =
    "https://api.github.com/repos/iamngoni/bitbucket-cli/releases/latest";

/// Canonical name of the installed binary (without an OS suffix).
pub const BINARY_NAME: &str = "bb";

/// Single environment override for the install directory.
pub const INSTALL_DIR_ENV: &str = "BB_INSTALL_DIR";

pub const USER_AGENT: &str = concat!("bb-install/", env!("CARGO_PKG_VERSION"));

/// Immutable configuration for one installer run.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub platform: Platform,
    pub install_dir: PathBuf,
    pub binary_name: String,
    /// Pinned release tag; `None` means resolve the latest release.
    pub requested_tag: Option<String>,
}

impl InstallConfig {
    /// Resolve the full configuration for this machine and invocation.
    pub fn from_cli(cli: &Cli) -> Result<Self, InstallError> {
        let platform = Platform::detect()?;
        let env_dir = std::env::var_os(INSTALL_DIR_ENV).map(PathBuf::from);
        Ok(Self::resolve(cli, platform, env_dir))
    }

    /// Install directory precedence: `--install-dir`, then `BB_INSTALL_DIR`,
    /// then the platform-conventional default.
    pub fn resolve(cli: &Cli, platform: Platform, env_install_dir: Option<PathBuf>) -> Self {
        let install_dir = cli
            .install_dir
            .clone()
            .or(env_install_dir)
            .unwrap_or_else(|| default_install_dir(platform));
        Self {
            platform,
            install_dir,
            binary_name: BINARY_NAME.to_string(),
            requested_tag: cli.tag.clone(),
        }
    }

    /// Final path the binary will occupy after a successful run.
    pub fn installed_path(&self) -> PathBuf {
        self.install_dir.join(self.platform.exe_name(&self.binary_name))
    }
}

fn default_install_dir(platform: Platform) -> PathBuf {
    if platform.is_windows() {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(r"C:\"))
            .join("Programs")
            .join("bb")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("bin")
    }
}
