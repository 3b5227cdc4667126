//! Run-scoped scratch workspace for downloads and extraction.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Ephemeral directory owning every intermediate artifact of one run.
///
/// The backing `TempDir` is removed on drop, so the success path, fatal
/// unwinds, and panics all clean up without explicit handling. Only a forced
/// process kill can leave the directory behind.
pub struct Workspace {
    root: TempDir,
    downloads: PathBuf,
    extracted: PathBuf,
}

impl Workspace {
    pub fn create() -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("bb-install-")
            .tempdir()
            .context("create scratch directory")?;
        let downloads = root.path().join("downloads");
        let extracted = root.path().join("extracted");
        std::fs::create_dir_all(&downloads).context("create downloads area")?;
        std::fs::create_dir_all(&extracted).context("create extraction area")?;
        Ok(Self {
            root,
            downloads,
            extracted,
        })
    }

    pub fn downloads(&self) -> &Path {
        &self.downloads
    }

    pub fn extracted(&self) -> &Path {
        &self.extracted
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}
