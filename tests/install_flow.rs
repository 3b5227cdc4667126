//! Offline exercise of the pipeline stages over a fixture archive:
//! checksum gate, extraction, binary placement, and re-run idempotency.

use std::io::Write;
use std::path::{Path, PathBuf};

use bb_install::checksum::{self, ChecksumOutcome};
use bb_install::cli::Cli;
use bb_install::config::InstallConfig;
use bb_install::error::InstallError;
use bb_install::platform::Platform;
use bb_install::{extract, installer};
use clap::Parser;
use flate2::Compression;
use flate2::write::GzEncoder;

const BB_SCRIPT: &[u8] = b"#!/bin/sh\necho 'bb version 1.2.0'\n";

fn linux() -> Platform {
    Platform::from_raw("linux", "x86_64").unwrap()
}

fn config_for(install_dir: &Path) -> InstallConfig {
    let cli = Cli::parse_from([
        "bb-install",
        "--tag",
        "v1.2.0",
        "--install-dir",
        install_dir.to_str().unwrap(),
    ]);
    InstallConfig::resolve(&cli, linux(), None)
}

/// Build a release-shaped tar.gz: `bb-linux-x86_64/bb` plus a stray README.
fn release_archive(dir: &Path) -> PathBuf {
    let payload = dir.join("bb-linux-x86_64");
    std::fs::create_dir_all(&payload).unwrap();
    std::fs::write(payload.join("bb"), BB_SCRIPT).unwrap();
    std::fs::write(payload.join("README.md"), b"# bb\n").unwrap();

    let archive_path = dir.join("bb-linux-x86_64.tar.gz");
    let file = std::fs::File::create(&archive_path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all("bb-linux-x86_64", &payload).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
    archive_path
}

#[tokio::test]
async fn verified_archive_installs_and_reruns_identically() {
    let work = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let archive = release_archive(work.path());

    // Publish a matching checksum resource next to the archive.
    let digest = checksum::sha256_file(&archive).unwrap();
    let checksum_path = work.path().join("bb-linux-x86_64.tar.gz.sha256");
    let mut file = std::fs::File::create(&checksum_path).unwrap();
    writeln!(file, "{digest}  bb-linux-x86_64.tar.gz").unwrap();

    let outcome = checksum::verify_archive(&archive, &checksum_path)
        .await
        .unwrap();
    assert_eq!(outcome, ChecksumOutcome::Verified);

    let extracted = work.path().join("extracted");
    std::fs::create_dir_all(&extracted).unwrap();
    extract::extract_archive(&archive, linux(), &extracted)
        .await
        .unwrap();

    let config = config_for(target.path());
    let candidate = installer::find_binary(&extracted, "bb").unwrap();
    let first = installer::install_binary(&candidate, &config).unwrap();
    assert_eq!(first, target.path().join("bb"));
    let first_bytes = std::fs::read(&first).unwrap();

    // Second run over the same artifact leaves identical content in place.
    let second = installer::install_binary(&candidate, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read(&second).unwrap(), first_bytes);
}

#[tokio::test]
async fn checksum_mismatch_blocks_every_later_stage() {
    let work = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let archive = release_archive(work.path());

    let checksum_path = work.path().join("bb-linux-x86_64.tar.gz.sha256");
    let mut file = std::fs::File::create(&checksum_path).unwrap();
    writeln!(file, "{}  bb-linux-x86_64.tar.gz", "f".repeat(64)).unwrap();

    match checksum::verify_archive(&archive, &checksum_path).await {
        Err(InstallError::ChecksumMismatch { .. }) => {}
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }

    // The flow aborts here, so nothing from the archive reaches the target.
    assert!(!target.path().join("bb").exists());
}

#[tokio::test]
async fn archive_without_expected_binary_fails_after_extraction() {
    let work = tempfile::tempdir().unwrap();
    let payload = work.path().join("bb-linux-x86_64");
    std::fs::create_dir_all(&payload).unwrap();
    std::fs::write(payload.join("LICENSE"), b"MIT\n").unwrap();

    let archive_path = work.path().join("bb-linux-x86_64.tar.gz");
    let file = std::fs::File::create(&archive_path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all("bb-linux-x86_64", &payload).unwrap();
    builder.into_inner().unwrap().finish().unwrap();

    let extracted = work.path().join("extracted");
    std::fs::create_dir_all(&extracted).unwrap();
    extract::extract_archive(&archive_path, linux(), &extracted)
        .await
        .unwrap();

    match installer::find_binary(&extracted, "bb") {
        Err(InstallError::BinaryNotFound { name }) => assert_eq!(name, "bb"),
        other => panic!("expected BinaryNotFound, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn installed_script_passes_post_install_verification() {
    use bb_install::verify;

    let work = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let archive = release_archive(work.path());

    let extracted = work.path().join("extracted");
    std::fs::create_dir_all(&extracted).unwrap();
    extract::extract_archive(&archive, linux(), &extracted)
        .await
        .unwrap();

    let config = config_for(target.path());
    let candidate = installer::find_binary(&extracted, "bb").unwrap();
    let final_path = installer::install_binary(&candidate, &config).unwrap();

    let line = verify::verify_install(&final_path).await.unwrap();
    assert_eq!(line, "bb version 1.2.0");
}
