//! CLI argument parsing for bb-install.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the installer.
#[derive(Parser, Debug, Clone)]
#[command(name = "bb-install")]
#[command(version, about = "Install the bb Bitbucket CLI from GitHub releases")]
pub struct Cli {
    /// Install a specific release tag (e.g. v1.2.0) instead of the latest release
    #[arg(long)]
    pub tag: Option<String>,

    /// Directory to install into (overrides BB_INSTALL_DIR and the platform default)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
