//! Artifact download: URL construction, archive streaming, checksum fetch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::config::{REPO_BASE, USER_AGENT};
use crate::error::InstallError;
use crate::platform::Platform;
use crate::retry::RetryPolicy;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Abort a download when no data arrives for this long.
const STALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Deterministic archive/checksum URL pair for one release artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub archive_url: String,
    pub checksum_url: String,
    pub archive_name: String,
}

impl DownloadDescriptor {
    /// `{repo}/releases/download/{tag}/{binary}-{platform}.{ext}`, with the
    /// checksum resource always at `{archive_url}.sha256`.
    pub fn new(binary_name: &str, tag: &str, platform: Platform) -> Self {
        let archive_name = format!(
            "{binary_name}-{}.{}",
            platform.canonical(),
            platform.archive_ext()
        );
        let archive_url = format!("{REPO_BASE}/releases/download/{tag}/{archive_name}");
        let checksum_url = format!("{archive_url}.sha256");
        Self {
            archive_url,
            checksum_url,
            archive_name,
        }
    }
}

/// Download the release archive into `dest_dir`. Failure here is fatal.
pub async fn fetch_archive(
    descriptor: &DownloadDescriptor,
    dest_dir: &Path,
) -> Result<PathBuf, InstallError> {
    let dest = dest_dir.join(&descriptor.archive_name);
    let result = async {
        let client = http_client()?;
        let policy = RetryPolicy::default();
        policy
            .run("archive download", || {
                download_to(&client, &descriptor.archive_url, &dest)
            })
            .await
    }
    .await;

    match result {
        Ok(()) => Ok(dest),
        Err(source) => Err(InstallError::Download {
            url: descriptor.archive_url.clone(),
            source,
        }),
    }
}

/// Best-effort fetch of the `.sha256` sibling resource.
///
/// Returns `None` when the resource cannot be retrieved; the caller decides
/// how loudly to warn. This fetch is single-shot since its failure does not
/// abort the run.
pub async fn fetch_checksum(
    descriptor: &DownloadDescriptor,
    dest_dir: &Path,
) -> Option<PathBuf> {
    let dest = dest_dir.join(format!("{}.sha256", descriptor.archive_name));
    match fetch_small(&descriptor.checksum_url, &dest).await {
        Ok(()) => Some(dest),
        Err(err) => {
            debug!("checksum resource fetch failed: {err:#}");
            None
        }
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("build HTTP client")
}

/// Stream a response body to disk with a byte progress bar and a stall
/// timeout on each chunk read.
async fn download_to(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    debug!("GET {url}");
    let response = client.get(url).send().await.context("request failed")?;
    if !response.status().is_success() {
        bail!("HTTP {} for {url}", response.status());
    }

    let total = response.content_length().unwrap_or(0);
    let pb = byte_progress_bar(total);

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("create {}", dest.display()))?;
    let mut stream = response.bytes_stream();

    loop {
        let chunk = match timeout(STALL_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(err))) => return Err(err.into()),
            Ok(None) => break,
            Err(_) => {
                return Err(anyhow!(
                    "no data received for {} seconds",
                    STALL_TIMEOUT.as_secs()
                ));
            }
        };
        file.write_all(&chunk).await.context("write archive chunk")?;
        pb.inc(chunk.len() as u64);
    }

    file.flush().await?;
    pb.finish_and_clear();
    Ok(())
}

async fn fetch_small(url: &str, dest: &Path) -> Result<()> {
    let client = http_client()?;
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        bail!("HTTP {} for {url}", response.status());
    }
    let body = response.bytes().await?;
    tokio::fs::write(dest, &body)
        .await
        .with_context(|| format!("write {}", dest.display()))?;
    Ok(())
}

fn byte_progress_bar(total: u64) -> ProgressBar {
    if total == 0 {
        return ProgressBar::new_spinner();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("   [{bar:50.green/blue}] {bytes}/{total_bytes}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(os: &str, arch: &str) -> Platform {
        Platform::from_raw(os, arch).unwrap()
    }

    #[test]
    fn archive_url_matches_release_convention() {
        let descriptor =
            DownloadDescriptor::new("bb", "v1.2.0", platform("linux", "x86_64"));
        assert_eq!(
            descriptor.archive_url,
            "https://github.com/iamngoni/bitbucket-cli/releases/download/v1.2.0/bb-linux-x86_64.tar.gz"
        );
        assert_eq!(
            descriptor.checksum_url,
            "https://github.com/iamngoni/bitbucket-cli/releases/download/v1.2.0/bb-linux-x86_64.tar.gz.sha256"
        );
    }

    #[test]
    fn windows_artifacts_are_zip() {
        let descriptor =
            DownloadDescriptor::new("bb", "v1.2.0", platform("windows", "x86_64"));
        assert_eq!(descriptor.archive_name, "bb-windows-x86_64.zip");
        assert!(descriptor.archive_url.ends_with("/bb-windows-x86_64.zip"));
    }

    #[test]
    fn darwin_uses_canonical_os_name() {
        let descriptor =
            DownloadDescriptor::new("bb", "v0.9.1", platform("macos", "aarch64"));
        assert_eq!(descriptor.archive_name, "bb-darwin-aarch64.tar.gz");
    }
}
