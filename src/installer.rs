//! Binary placement into the install target.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use walkdir::WalkDir;

use crate::config::InstallConfig;
use crate::error::InstallError;

/// Locate the extracted executable by name.
///
/// Candidates are sorted by full path and the lexicographically first one
/// wins, so repeated runs over the same archive always pick the same file
/// regardless of directory traversal order.
pub fn find_binary(extract_dir: &Path, exe_name: &str) -> Result<PathBuf, InstallError> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(extract_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file() && entry.file_name().to_str() == Some(exe_name)
        })
        .map(|entry| entry.into_path())
        .collect();
    candidates.sort();

    match candidates.into_iter().next() {
        Some(path) => {
            debug!("selected binary candidate {}", path.display());
            Ok(path)
        }
        None => Err(InstallError::BinaryNotFound {
            name: exe_name.to_string(),
        }),
    }
}

/// Copy the located binary into the install target under its canonical name.
///
/// The target directory is created if absent, any existing file is replaced
/// unconditionally, and the executable bit is set on POSIX targets.
pub fn install_binary(source: &Path, config: &InstallConfig) -> Result<PathBuf, InstallError> {
    place(source, config).map_err(InstallError::Install)
}

fn place(source: &Path, config: &InstallConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.install_dir)
        .with_context(|| format!("create {}", config.install_dir.display()))?;

    let dest = config.installed_path();
    std::fs::copy(source, &dest)
        .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&dest)
            .with_context(|| format!("read metadata for {}", dest.display()))?
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&dest, perms)
            .with_context(|| format!("set permissions on {}", dest.display()))?;
    }

    debug!("installed {}", dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::platform::Platform;
    use clap::Parser;

    fn config_for(dir: &Path) -> InstallConfig {
        let cli = Cli::parse_from([
            "bb-install",
            "--install-dir",
            dir.to_str().unwrap(),
        ]);
        InstallConfig::resolve(&cli, Platform::from_raw("linux", "x86_64").unwrap(), None)
    }

    #[test]
    fn picks_lexicographically_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["zz", "aa/tools", "mm"] {
            let d = dir.path().join(sub);
            std::fs::create_dir_all(&d).unwrap();
            std::fs::write(d.join("bb"), sub).unwrap();
        }

        let found = find_binary(dir.path(), "bb").unwrap();
        assert!(found.ends_with("aa/tools/bb"));
    }

    #[test]
    fn ignores_directories_with_matching_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bb")).unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("bb"), b"binary").unwrap();

        let found = find_binary(dir.path(), "bb").unwrap();
        assert!(found.is_file());
    }

    #[test]
    fn missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), b"docs").unwrap();
        match find_binary(dir.path(), "bb") {
            Err(InstallError::BinaryNotFound { name }) => assert_eq!(name, "bb"),
            other => panic!("expected BinaryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn installs_under_canonical_name_and_overwrites() {
        let work = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let config = config_for(target.path());

        let source = work.path().join("bb");
        std::fs::write(&source, b"new contents").unwrap();

        // Pre-existing file at the target must be replaced unconditionally.
        std::fs::write(target.path().join("bb"), b"stale").unwrap();

        let dest = install_binary(&source, &config).unwrap();
        assert_eq!(dest, target.path().join("bb"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"new contents");
    }

    #[test]
    fn creates_missing_target_directory() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("deep").join("bin");
        let config = config_for(&target);

        let source = work.path().join("bb");
        std::fs::write(&source, b"payload").unwrap();

        let dest = install_binary(&source, &config).unwrap();
        assert!(dest.is_file());

        // A second run is idempotent.
        let dest2 = install_binary(&source, &config).unwrap();
        assert_eq!(dest, dest2);
        assert_eq!(std::fs::read(&dest2).unwrap(), b"payload");
    }

    #[cfg(unix)]
    #[test]
    fn sets_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let work = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let config = config_for(target.path());

        let source = work.path().join("bb");
        std::fs::write(&source, b"#!/bin/sh\n").unwrap();

        let dest = install_binary(&source, &config).unwrap();
        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
