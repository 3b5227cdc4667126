//! Post-install sanity check.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tokio::process::Command;

/// Run the installed binary with `--version` and return the first line of
/// its output.
///
/// Failures here never abort the run; the caller downgrades them to an
/// "installed but unverifiable" warning.
pub async fn verify_install(binary: &Path) -> Result<String> {
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .await
        .with_context(|| format!("spawn {}", binary.display()))?;

    if !output.status.success() {
        return Err(anyhow!(
            "{} --version exited with {}",
            binary.display(),
            output.status
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{} --version produced no output", binary.display()))
}
