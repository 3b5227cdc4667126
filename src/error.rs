//! Installer error taxonomy.
//!
//! Every variant here is fatal: it aborts the remainder of the flow and the
//! process exits non-zero. Non-fatal conditions (missing checksum resource,
//! failed post-install verification) are reported as warnings and never
//! surface as values of this type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unsupported platform: {os}-{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("could not resolve the release version")]
    VersionResolution(#[source] anyhow::Error),

    #[error("download failed for {url}")]
    Download {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("checksum mismatch for {}: expected {expected}, computed {actual}", .archive.display())]
    ChecksumMismatch {
        archive: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("could not extract {}", .archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("no `{name}` executable found in the extracted archive")]
    BinaryNotFound { name: String },

    /// Raised only by the Windows PATH strategy; the POSIX strategy never
    /// produces an error of this kind.
    #[error("could not register the install directory on PATH")]
    PathRegistration(#[source] anyhow::Error),

    #[error("could not prepare the scratch workspace")]
    Workspace(#[source] anyhow::Error),

    #[error("could not place the binary into the install target")]
    Install(#[source] anyhow::Error),
}
