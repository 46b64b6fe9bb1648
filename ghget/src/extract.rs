//! Archive extraction: recover exactly one named member from a downloaded
//! asset and install it as an executable.
//!
//! The container format is detected from the asset's filename suffix.
//! Unrecognized suffixes fall through to raw-binary handling, since plenty
//! of projects publish bare executables, so there is no "unsupported
//! container" failure mode.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

use crate::error::{GhGetError, Result};

/// Container format, detected from the asset filename. Checked in table
/// order; first suffix match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    TarGz,
    TarXz,
    TarBz2,
    Zip,
    Raw,
}

impl ContainerFormat {
    pub fn from_asset_name(name: &str) -> Self {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            ContainerFormat::TarGz
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            ContainerFormat::TarXz
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            ContainerFormat::TarBz2
        } else if name.ends_with(".zip") {
            ContainerFormat::Zip
        } else {
            ContainerFormat::Raw
        }
    }
}

/// Where the extracted binary may land: the primary path is tried first,
/// the fallback exactly once if creating the file there fails. The default
/// pair is `/usr/local/bin` and `$HOME/bin`.
#[derive(Debug, Clone)]
pub struct InstallDirs {
    pub primary: PathBuf,
    pub fallback: PathBuf,
}

impl Default for InstallDirs {
    fn default() -> Self {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("~"));

        Self {
            primary: PathBuf::from("/usr/local/bin"),
            fallback: home.join("bin"),
        }
    }
}

/// Extract the member named `member` (case-insensitive) from `stream` and
/// write it, mode 0755, to `output_name` under the install dirs. For raw
/// (non-archive) assets the whole stream is the member and `member` is
/// ignored. Returns the path actually written.
pub fn extract<R: Read>(
    mut stream: R,
    asset_name: &str,
    member: &str,
    output_name: &str,
    dirs: &InstallDirs,
) -> Result<PathBuf> {
    let format = ContainerFormat::from_asset_name(asset_name);
    tracing::debug!("extracting {} as {:?}", asset_name, format);

    match format {
        ContainerFormat::TarGz => extract_tar(
            flate2::read::GzDecoder::new(stream),
            asset_name,
            member,
            output_name,
            dirs,
        ),
        ContainerFormat::TarXz => extract_tar(
            xz2::read::XzDecoder::new(stream),
            asset_name,
            member,
            output_name,
            dirs,
        ),
        ContainerFormat::TarBz2 => extract_tar(
            bzip2::read::BzDecoder::new(stream),
            asset_name,
            member,
            output_name,
            dirs,
        ),
        ContainerFormat::Zip => extract_zip(&mut stream, asset_name, member, output_name, dirs),
        ContainerFormat::Raw => write_output(&mut stream, output_name, dirs),
    }
}

/// Stream tar entries in archive order and write the first regular file
/// whose name equals the member pattern. Directories, symlinks and other
/// non-file entries are skipped. Scanning stops after a successful write.
fn extract_tar<R: Read>(
    reader: R,
    asset_name: &str,
    member: &str,
    output_name: &str,
    dirs: &InstallDirs,
) -> Result<PathBuf> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().map_err(GhGetError::StreamRead)? {
        let mut entry = entry.map_err(GhGetError::StreamRead)?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = entry
            .path()
            .map_err(GhGetError::StreamRead)?
            .to_string_lossy()
            .into_owned();
        if !name.eq_ignore_ascii_case(member) {
            continue;
        }

        tracing::debug!("found member '{}' in {}", name, asset_name);
        return write_output(&mut entry, output_name, dirs);
    }

    Err(GhGetError::NoMemberMatch {
        member: member.to_string(),
        archive: asset_name.to_string(),
    })
}

/// Zip needs random access, so the whole stream is buffered in memory
/// before indexing. Entries are visited in directory order with the same
/// first-match rule as tar.
fn extract_zip<R: Read>(
    stream: &mut R,
    asset_name: &str,
    member: &str,
    output_name: &str,
    dirs: &InstallDirs,
) -> Result<PathBuf> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).map_err(GhGetError::StreamRead)?;

    let mut archive = zip::ZipArchive::new(Cursor::new(buf))
        .map_err(|e| GhGetError::StreamRead(io::Error::other(e)))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| GhGetError::StreamRead(io::Error::other(e)))?;

        if !file.is_file() {
            continue;
        }

        if !file.name().eq_ignore_ascii_case(member) {
            continue;
        }

        tracing::debug!("found member '{}' in {}", file.name(), asset_name);
        return write_output(&mut file, output_name, dirs);
    }

    Err(GhGetError::NoMemberMatch {
        member: member.to_string(),
        archive: asset_name.to_string(),
    })
}

/// Create the output file (primary path, then fallback), set mode 0755,
/// and copy the member's bytes into it.
fn write_output<R: Read>(reader: &mut R, output_name: &str, dirs: &InstallDirs) -> Result<PathBuf> {
    let (mut file, path) = create_output(output_name, dirs)?;

    make_executable(&file).map_err(GhGetError::StreamWrite)?;
    io::copy(reader, &mut file).map_err(GhGetError::StreamWrite)?;
    file.sync_all().map_err(GhGetError::StreamWrite)?;

    tracing::info!("wrote {}", path.display());
    Ok(path)
}

/// Try the primary install path; on failure (commonly permissions) retry
/// once at the fallback. The fallback directory is expected to exist — it
/// is not created here.
fn create_output(output_name: &str, dirs: &InstallDirs) -> Result<(fs::File, PathBuf)> {
    let primary = dirs.primary.join(output_name);
    match fs::File::create(&primary) {
        Ok(file) => Ok((file, primary)),
        Err(primary_err) => {
            let fallback = dirs.fallback.join(output_name);
            tracing::debug!(
                "could not create {} ({}); falling back to {}",
                primary.display(),
                primary_err,
                fallback.display()
            );
            match fs::File::create(&fallback) {
                Ok(file) => Ok((file, fallback)),
                Err(source) => Err(GhGetError::InstallPath {
                    name: output_name.to_string(),
                    primary: dirs.primary.clone(),
                    fallback: dirs.fallback.clone(),
                    source,
                }),
            }
        }
    }
}

#[cfg(unix)]
fn make_executable(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn test_dirs() -> (tempfile::TempDir, tempfile::TempDir, InstallDirs) {
        let primary = tempdir().unwrap();
        let fallback = tempdir().unwrap();
        let dirs = InstallDirs {
            primary: primary.path().to_path_buf(),
            fallback: fallback.path().to_path_buf(),
        };
        (primary, fallback, dirs)
    }

    fn tar_gz_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
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

    #[test]
    fn test_format_detection_order() {
        let cases = [
            ("a.tar.gz", ContainerFormat::TarGz),
            ("a.tgz", ContainerFormat::TarGz),
            ("a.tar.xz", ContainerFormat::TarXz),
            ("a.txz", ContainerFormat::TarXz),
            ("a.tar.bz2", ContainerFormat::TarBz2),
            ("a.tbz2", ContainerFormat::TarBz2),
            ("a.zip", ContainerFormat::Zip),
            ("a", ContainerFormat::Raw),
            ("a.exe", ContainerFormat::Raw),
            // Unknown archive suffixes fall through to raw by design.
            ("a.tar.zst", ContainerFormat::Raw),
        ];

        for (name, expected) in cases {
            assert_eq!(ContainerFormat::from_asset_name(name), expected, "{name}");
        }
    }

    #[test]
    fn test_tar_member_match_is_case_insensitive() {
        let archive = tar_gz_with(&[("BIN/Tool", b"payload")]);
        let (_p, _f, dirs) = test_dirs();

        let path = extract(&archive[..], "a.tar.gz", "bin/tool", "tool", &dirs).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"payload");
    }

    #[test]
    fn test_tar_first_match_wins() {
        let archive = tar_gz_with(&[("bin/tool", b"first"), ("BIN/TOOL", b"second")]);
        let (_p, _f, dirs) = test_dirs();

        let path = extract(&archive[..], "a.tgz", "bin/tool", "tool", &dirs).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"first");
    }

    #[test]
    fn test_tar_no_member_is_hard_failure() {
        let archive = tar_gz_with(&[("README.md", b"docs")]);
        let (primary, _f, dirs) = test_dirs();

        let err = extract(&archive[..], "a.tar.gz", "bin/tool", "tool", &dirs).unwrap_err();
        assert!(matches!(err, GhGetError::NoMemberMatch { .. }));
        // Nothing was written.
        assert_eq!(fs::read_dir(primary.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_tar_xz_roundtrip() {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        {
            let mut builder = tar::Builder::new(&mut encoder);
            let data = b"xz payload";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, "tool", &data[..]).unwrap();
            builder.finish().unwrap();
        }
        let archive = encoder.finish().unwrap();
        let (_p, _f, dirs) = test_dirs();

        let path = extract(&archive[..], "a.txz", "tool", "tool", &dirs).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"xz payload");
    }

    #[test]
    fn test_tar_bz2_roundtrip() {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        {
            let mut builder = tar::Builder::new(&mut encoder);
            let data = b"bz2 payload";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, "tool", &data[..]).unwrap();
            builder.finish().unwrap();
        }
        let archive = encoder.finish().unwrap();
        let (_p, _f, dirs) = test_dirs();

        let path = extract(&archive[..], "a.tar.bz2", "tool", "tool", &dirs).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"bz2 payload");
    }

    #[test]
    fn test_zip_member_extraction() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("bin/tool", options).unwrap();
        writer.write_all(b"zipped payload").unwrap();
        writer.start_file("README.md", options).unwrap();
        writer.write_all(b"docs").unwrap();
        let archive = writer.finish().unwrap().into_inner();
        let (_p, _f, dirs) = test_dirs();

        let path = extract(&archive[..], "a.zip", "BIN/TOOL", "tool", &dirs).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"zipped payload");
    }

    #[test]
    fn test_zip_no_member_is_hard_failure() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("other", options).unwrap();
        writer.write_all(b"x").unwrap();
        let archive = writer.finish().unwrap().into_inner();
        let (_p, _f, dirs) = test_dirs();

        let err = extract(&archive[..], "a.zip", "tool", "tool", &dirs).unwrap_err();
        assert!(matches!(err, GhGetError::NoMemberMatch { .. }));
    }

    #[test]
    fn test_raw_stream_copied_verbatim() {
        let payload: &[u8] = b"\x7fELF raw binary";
        let (primary, _f, dirs) = test_dirs();

        let path = extract(payload, "mytool-linux-amd64", "", "mytool", &dirs).unwrap();
        assert_eq!(path, primary.path().join("mytool"));
        assert_eq!(fs::read(&path).unwrap(), payload);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_mode_is_0755() {
        use std::os::unix::fs::PermissionsExt;

        let archive = tar_gz_with(&[("tool", b"payload")]);
        let (_p, _f, dirs) = test_dirs();

        let path = extract(&archive[..], "a.tar.gz", "tool", "tool", &dirs).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_fallback_untouched_when_primary_writable() {
        let archive = tar_gz_with(&[("tool", b"payload")]);
        let (primary, fallback, dirs) = test_dirs();

        let path = extract(&archive[..], "a.tar.gz", "tool", "tool", &dirs).unwrap();
        assert_eq!(path, primary.path().join("tool"));
        assert_eq!(fs::read_dir(fallback.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fallback_on_primary_failure() {
        let archive = tar_gz_with(&[("tool", b"payload")]);
        let fallback = tempdir().unwrap();
        // A primary whose parent does not exist cannot be created.
        let dirs = InstallDirs {
            primary: fallback.path().join("missing").join("bin"),
            fallback: fallback.path().to_path_buf(),
        };

        let path = extract(&archive[..], "a.tar.gz", "tool", "tool", &dirs).unwrap();
        assert_eq!(path, fallback.path().join("tool"));
        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_both_paths_failing_is_install_path_error() {
        let archive = tar_gz_with(&[("tool", b"payload")]);
        let scratch = tempdir().unwrap();
        let dirs = InstallDirs {
            primary: scratch.path().join("no-such").join("bin"),
            fallback: scratch.path().join("also-missing").join("bin"),
        };

        let err = extract(&archive[..], "a.tar.gz", "tool", "tool", &dirs).unwrap_err();
        assert!(matches!(err, GhGetError::InstallPath { .. }));
    }
}
