//! Archive extraction into the scratch workspace.
//!
//! The codec is selected once from the platform descriptor: Windows release
//! artifacts are zip archives, everything else is tar.gz. Extraction is
//! CPU-bound, so both codecs run under `spawn_blocking`.

use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::InstallError;
use crate::platform::Platform;

/// Unpack `archive` into `dest` using the codec implied by the platform.
pub async fn extract_archive(
    archive: &Path,
    platform: Platform,
    dest: &Path,
) -> Result<(), InstallError> {
    let result = if platform.is_windows() {
        extract_zip(archive, dest).await
    } else {
        extract_tar_gz(archive, dest).await
    };
    result.map_err(|source| InstallError::Extraction {
        archive: archive.to_path_buf(),
        source,
    })
}

async fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file =
            std::fs::File::open(&archive).with_context(|| format!("open {}", archive.display()))?;
        let tar = GzDecoder::new(file);
        Archive::new(tar)
            .unpack(&dest)
            .context("unpack tar.gz archive")?;
        Ok::<_, anyhow::Error>(())
    })
    .await
    .context("extraction task panicked")??;
    Ok(())
}

async fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file =
            std::fs::File::open(&archive).with_context(|| format!("open {}", archive.display()))?;
        let mut zip = zip::ZipArchive::new(file).context("read zip archive")?;
        zip.extract(&dest).context("unpack zip archive")?;
        Ok::<_, anyhow::Error>(())
    })
    .await
    .context("extraction task panicked")??;
    Ok(())
}
