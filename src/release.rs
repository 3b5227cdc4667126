//! Release tag resolution against the GitHub API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use serde::Deserialize;

use crate::config::{InstallConfig, RELEASE_API, USER_AGENT};
use crate::error::InstallError;
use crate::retry::RetryPolicy;

const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Latest-release metadata returned by the GitHub API.
#[derive(Deserialize, Debug)]
struct LatestRelease {
    tag_name: String,
}

/// Resolve the release tag to install.
///
/// A pinned `--tag` bypasses the network entirely; otherwise one GET against
/// the latest-release endpoint decides. The resolved tag is accepted as-is
/// and never re-validated against the release list.
pub async fn resolve_version(config: &InstallConfig) -> Result<String, InstallError> {
    if let Some(tag) = &config.requested_tag {
        if tag.trim().is_empty() {
            return Err(InstallError::VersionResolution(anyhow!(
                "requested release tag is empty"
            )));
        }
        debug!("using pinned release tag {tag}");
        return Ok(tag.clone());
    }
    fetch_latest_tag().await.map_err(InstallError::VersionResolution)
}

async fn fetch_latest_tag() -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(METADATA_TIMEOUT)
        .build()
        .context("build HTTP client")?;

    let policy = RetryPolicy::default();
    let body = policy
        .run("release metadata fetch", || {
            let client = &client;
            async move {
                let response = client.get(RELEASE_API).send().await?;
                if !response.status().is_success() {
                    bail!("GitHub API error: HTTP {}", response.status());
                }
                Ok(response.text().await?)
            }
        })
        .await?;

    parse_tag(&body)
}

/// Extract a non-empty `tag_name` from the latest-release JSON document.
fn parse_tag(body: &str) -> Result<String> {
    let release: LatestRelease =
        serde_json::from_str(body).context("malformed release metadata")?;
    if release.tag_name.trim().is_empty() {
        bail!("release metadata has an empty tag_name");
    }
    Ok(release.tag_name)
}
