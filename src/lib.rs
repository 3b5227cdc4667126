//! Installer for the `bb` Bitbucket CLI.
//!
//! The flow is strictly linear: resolve the platform, resolve the release
//! tag, download the matching archive (plus, best-effort, its `.sha256`
//! sibling), verify it when possible, unpack it into a run-scoped scratch
//! workspace, place the binary into the install target, make sure the target
//! is reachable from a shell, and run `bb --version` as a sanity check.
//! Every fatal condition unwinds the whole flow; the scratch workspace is
//! cleaned up on all exit paths.

pub mod checksum;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod installer;
pub mod path_env;
pub mod platform;
pub mod release;
pub mod report;
pub mod retry;
pub mod verify;
pub mod workspace;

use std::path::PathBuf;

use log::info;

use crate::checksum::ChecksumOutcome;
use crate::config::InstallConfig;
use crate::download::DownloadDescriptor;
use crate::error::InstallError;
use crate::report::Reporter;
use crate::workspace::Workspace;

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ERROR: i32 = 1;
}

/// Terminal state of a completed run.
///
/// `verified` is false when the post-install sanity check could not run but
/// the binary was placed successfully; that outcome still exits zero.
#[derive(Debug)]
pub struct InstallationResult {
    pub final_path: PathBuf,
    pub version: String,
    pub verified: bool,
}

/// Run the full install flow with the given configuration.
pub async fn run(
    config: &InstallConfig,
    reporter: &mut Reporter,
) -> Result<InstallationResult, InstallError> {
    let version = release::resolve_version(config).await?;
    reporter.info(&format!(
        "Installing bb {version} for {}",
        config.platform.canonical()
    ));

    let workspace = Workspace::create().map_err(InstallError::Workspace)?;
    let descriptor = DownloadDescriptor::new(&config.binary_name, &version, config.platform);

    reporter.info(&format!("Downloading {}", descriptor.archive_url));
    let archive = download::fetch_archive(&descriptor, workspace.downloads()).await?;

    match download::fetch_checksum(&descriptor, workspace.downloads()).await {
        Some(checksum_path) => match checksum::verify_archive(&archive, &checksum_path).await? {
            ChecksumOutcome::Verified => reporter.info("Checksum verified"),
            ChecksumOutcome::Unavailable(reason) => {
                reporter.warn(&format!("proceeding without integrity verification: {reason}"));
            }
        },
        None => {
            reporter.warn(
                "checksum resource unavailable; proceeding without integrity verification",
            );
        }
    }

    extract::extract_archive(&archive, config.platform, workspace.extracted()).await?;

    let exe_name = config.platform.exe_name(&config.binary_name);
    let candidate = installer::find_binary(workspace.extracted(), &exe_name)?;
    let final_path = installer::install_binary(&candidate, config)?;
    reporter.info(&format!("Installed {}", final_path.display()));

    path_env::register_path(config, reporter)?;

    let verified = match verify::verify_install(&final_path).await {
        Ok(line) => {
            reporter.info(&line);
            true
        }
        Err(err) => {
            reporter.warn(&format!("installed but unverifiable: {err:#}"));
            false
        }
    };

    info!("scratch workspace {} released", workspace.path().display());
    drop(workspace);

    Ok(InstallationResult {
        final_path,
        version,
        verified,
    })
}
