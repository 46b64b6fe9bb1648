//! End-to-end extraction tests: build real archives in memory, run them
//! through the dispatcher, and verify exactly one executable lands at a
//! deterministic path.

use std::fs;
use std::io::{Cursor, Write};

use ghget::error::GhGetError;
use ghget::extract::{extract, InstallDirs};
use tempfile::TempDir;

fn install_dirs() -> (TempDir, TempDir, InstallDirs) {
    let primary = TempDir::new().unwrap();
    let fallback = TempDir::new().unwrap();
    let dirs = InstallDirs {
        primary: primary.path().to_path_buf(),
        fallback: fallback.path().to_path_buf(),
    };
    (primary, fallback, dirs)
}

fn tar_gz(members: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn zip_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[cfg(unix)]
fn assert_mode_0755(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755, "{}", path.display());
}

#[cfg(not(unix))]
fn assert_mode_0755(_path: &std::path::Path) {}

#[test]
fn test_tar_gz_writes_exactly_one_executable() {
    let archive = tar_gz(&[
        ("README.md", b"docs"),
        ("bin/tool", b"#!/bin/sh\necho tool\n"),
        ("LICENSE", b"mit"),
    ]);
    let (primary, fallback, dirs) = install_dirs();

    let path = extract(
        &archive[..],
        "tool_1.0.0_linux_amd64.tar.gz",
        "bin/tool",
        "tool",
        &dirs,
    )
    .unwrap();

    assert_eq!(path, primary.path().join("tool"));
    assert_eq!(fs::read(&path).unwrap(), b"#!/bin/sh\necho tool\n");
    assert_mode_0755(&path);

    // Exactly one file, and only in the primary directory.
    assert_eq!(fs::read_dir(primary.path()).unwrap().count(), 1);
    assert_eq!(fs::read_dir(fallback.path()).unwrap().count(), 0);
}

#[test]
fn test_zip_writes_exactly_one_executable() {
    let archive = zip_archive(&[
        ("README.md", b"docs"),
        ("bin/tool", b"zip tool payload"),
    ]);
    let (primary, fallback, dirs) = install_dirs();

    let path = extract(
        &archive[..],
        "tool_1.0.0_windows_amd64.zip",
        "bin/tool",
        "tool",
        &dirs,
    )
    .unwrap();

    assert_eq!(path, primary.path().join("tool"));
    assert_eq!(fs::read(&path).unwrap(), b"zip tool payload");
    assert_mode_0755(&path);
    assert_eq!(fs::read_dir(fallback.path()).unwrap().count(), 0);
}

#[test]
fn test_bare_binary_stream_installs_whole_stream() {
    let payload: &[u8] = b"\x7fELF unpacked binary bytes";
    let (primary, _fallback, dirs) = install_dirs();

    let path = extract(payload, "tool-linux-amd64", "bin/tool", "tool", &dirs).unwrap();

    // No container: the member pattern plays no part.
    assert_eq!(path, primary.path().join("tool"));
    assert_eq!(fs::read(&path).unwrap(), payload);
    assert_mode_0755(&path);
}

#[test]
fn test_member_match_ignores_case() {
    let archive = tar_gz(&[("Bin/Tool", b"cased")]);
    let (_primary, _fallback, dirs) = install_dirs();

    let path = extract(&archive[..], "a.tgz", "bin/tool", "tool", &dirs).unwrap();
    assert_eq!(fs::read(path).unwrap(), b"cased");
}

#[test]
fn test_missing_member_fails_without_writing() {
    let archive = tar_gz(&[("docs/README.md", b"docs")]);
    let (primary, fallback, dirs) = install_dirs();

    let err = extract(&archive[..], "a.tar.gz", "bin/tool", "tool", &dirs).unwrap_err();
    assert!(matches!(err, GhGetError::NoMemberMatch { .. }));
    assert_eq!(fs::read_dir(primary.path()).unwrap().count(), 0);
    assert_eq!(fs::read_dir(fallback.path()).unwrap().count(), 0);
}

#[test]
fn test_fallback_path_used_when_primary_unavailable() {
    let archive = tar_gz(&[("tool", b"payload")]);
    let scratch = TempDir::new().unwrap();
    let dirs = InstallDirs {
        // Creating a file under a nonexistent directory fails, which is
        // the same observable behavior as an unwritable /usr/local/bin.
        primary: scratch.path().join("usr-local-bin-stand-in").join("bin"),
        fallback: scratch.path().to_path_buf(),
    };

    let path = extract(&archive[..], "a.tar.gz", "tool", "tool", &dirs).unwrap();
    assert_eq!(path, scratch.path().join("tool"));
    assert_eq!(fs::read(&path).unwrap(), b"payload");
    assert_mode_0755(&path);
}
