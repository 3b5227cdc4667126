//! Archive integrity verification against a published SHA-256 digest.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use sha2::{Digest, Sha256};

use crate::error::InstallError;

const BUF_SIZE: usize = 64 * 1024;

/// Result of the verification stage when it does not abort the run.
#[derive(Debug, PartialEq, Eq)]
pub enum ChecksumOutcome {
    Verified,
    /// The checksum resource was unusable; install proceeds unverified.
    Unavailable(String),
}

/// Compute SHA-256 of a file as lowercase hex, reading in bounded chunks.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// First whitespace-delimited token of a checksum resource, lowercased.
/// The usual format is `<hex-digest> <filename>`.
pub fn parse_expected_digest(contents: &str) -> Option<String> {
    contents
        .split_whitespace()
        .next()
        .map(|token| token.to_ascii_lowercase())
}

/// Verify `archive` against the checksum resource at `checksum_path`.
///
/// A digest mismatch is fatal: nothing from the archive may be extracted or
/// installed after it. An unreadable or empty checksum resource is treated
/// like an absent one (warn and proceed unverified). Hashing the archive is
/// CPU-bound, so it runs under `spawn_blocking`.
pub async fn verify_archive(
    archive: &Path,
    checksum_path: &Path,
) -> Result<ChecksumOutcome, InstallError> {
    let archive = archive.to_path_buf();
    let checksum_path = checksum_path.to_path_buf();
    tokio::task::spawn_blocking(move || verify_archive_blocking(&archive, &checksum_path))
        .await
        .map_err(|err| InstallError::Workspace(anyhow!("digest task panicked: {err}")))?
}

fn verify_archive_blocking(
    archive: &Path,
    checksum_path: &Path,
) -> Result<ChecksumOutcome, InstallError> {
    let contents = match std::fs::read_to_string(checksum_path) {
        Ok(contents) => contents,
        Err(err) => {
            return Ok(ChecksumOutcome::Unavailable(format!(
                "checksum resource unreadable: {err}"
            )));
        }
    };
    let Some(expected) = parse_expected_digest(&contents) else {
        return Ok(ChecksumOutcome::Unavailable(
            "checksum resource is empty".to_string(),
        ));
    };

    let actual = sha256_file(archive).map_err(InstallError::Workspace)?;
    if expected == actual {
        Ok(ChecksumOutcome::Verified)
    } else {
        Err(InstallError::ChecksumMismatch {
            archive: archive.to_path_buf(),
            expected,
            actual,
        })
    }
}
