//! Inspects a candidate folder and decides whether it holds a launchable
//! Loxone Config installation.

use crate::error::ProbeError;
use crate::platform::is_launchable;
use crate::version::{extract_version, normalize, VersionTuple};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Inno Setup uninstall log written next to every installation.
pub const METADATA_FILE: &str = "unins000.dat";

/// Executable names checked directly inside the installation folder, in order.
pub const CONVENTIONAL_EXECUTABLES: [&str; 3] =
    ["LoxoneConfig.exe", "Loxone Config.exe", "LoxoneConfig"];

/// Lowercase product fragment used for the nested executable search.
pub const PRODUCT_NAME: &str = "loxone";

/// A confirmed installation that has not been placed in a catalog yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbedInstallation {
    pub folder_name: String,
    pub version_display: String,
    pub version: VersionTuple,
    pub install_path: PathBuf,
    pub executable_path: PathBuf,
}

#[derive(Debug)]
pub enum MetadataRead {
    Absent,
    Read(String),
    Failed(io::Error),
}

pub fn read_metadata(dir: &Path) -> MetadataRead {
    let path = dir.join(METADATA_FILE);
    match fs::read(&path) {
        // The log mixes binary records with Latin-1/UTF-16 text; dropping NULs
        // makes UTF-16LE ASCII readable as well.
        Ok(bytes) => {
            let bytes: Vec<u8> = bytes.into_iter().filter(|b| *b != 0).collect();
            MetadataRead::Read(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => MetadataRead::Absent,
        Err(e) => MetadataRead::Failed(e),
    }
}

/// Version string for a candidate, `"Unknown"` if there is none to be had.
pub fn detect_version(dir: &Path) -> String {
    let text = match read_metadata(dir) {
        MetadataRead::Read(text) => Some(text),
        MetadataRead::Absent => {
            tracing::debug!("No {} in {}", METADATA_FILE, dir.display());
            None
        }
        MetadataRead::Failed(e) => {
            tracing::warn!(
                "Could not read {} in {}: {}",
                METADATA_FILE,
                dir.display(),
                e
            );
            None
        }
    };
    extract_version(text.as_deref())
}

/// Locate the program to start for an installation folder.
///
/// Conventional names directly inside `dir` win; otherwise the first
/// launchable file below `dir` whose name contains the product name.
/// `Ok(None)` means the folder simply has no executable.
pub fn find_executable(dir: &Path) -> Result<Option<PathBuf>, ProbeError> {
    for name in CONVENTIONAL_EXECUTABLES {
        let path = dir.join(name);
        if path.is_file() {
            tracing::debug!("Found conventional executable {}", path.display());
            return Ok(Some(path));
        }
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
                return Err(ProbeError::Enumerate {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable entry below {}: {}", dir.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() && !entry.path().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_lowercase();
        if file_name.contains(PRODUCT_NAME) && is_launchable(entry.path()) {
            tracing::debug!("Found nested executable {}", entry.path().display());
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}

/// Probe one candidate folder.
///
/// A folder without an executable yields `Ok(None)` whatever its metadata
/// says. Unreadable metadata only costs the version.
pub fn probe(candidate: &Path) -> Result<Option<ProbedInstallation>, ProbeError> {
    let install_path = absolute(candidate);

    let Some(executable_path) = find_executable(&install_path)? else {
        tracing::info!(
            "Skipping {}: no executable found",
            install_path.display()
        );
        return Ok(None);
    };

    let version_display = detect_version(&install_path);
    let version = normalize(&version_display);
    if version.is_unknown() {
        tracing::warn!(
            "Could not determine the version of {}",
            install_path.display()
        );
    }
    let folder_name = install_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(
        "Probed {} as version {} ({})",
        folder_name,
        version_display,
        executable_path.display()
    );

    Ok(Some(ProbedInstallation {
        folder_name,
        version_display,
        version,
        install_path,
        executable_path,
    }))
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::UNKNOWN_VERSION;
    use tempfile::tempdir;

    fn write_metadata(dir: &Path, text: &str) {
        let mut bytes = vec![0x49, 0x6e, 0x6e, 0x6f, 0x00, 0xff, 0x01];
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(&[0x00, 0x02, 0xfe]);
        fs::write(dir.join(METADATA_FILE), bytes).unwrap();
    }

    #[test]
    fn test_probe_conventional_executable_with_metadata() {
        let dir = tempdir().unwrap();
        let install = dir.path().join("LoxoneConfig16");
        fs::create_dir(&install).unwrap();
        fs::write(install.join("LoxoneConfig.exe"), b"MZ").unwrap();
        write_metadata(&install, "Loxone Config 16.0.6.10");

        let probed = probe(&install).unwrap().unwrap();
        assert_eq!(probed.folder_name, "LoxoneConfig16");
        assert_eq!(probed.version_display, "16.0.6.10");
        assert_eq!(probed.version, VersionTuple::new(16, 0, 6, 10));
        assert_eq!(probed.install_path, install);
        assert_eq!(probed.executable_path, install.join("LoxoneConfig.exe"));
    }

    #[test]
    fn test_conventional_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("LoxoneConfig"), b"x").unwrap();
        fs::write(dir.path().join("Loxone Config.exe"), b"MZ").unwrap();
        assert_eq!(
            find_executable(dir.path()).unwrap(),
            Some(dir.path().join("Loxone Config.exe"))
        );
    }

    #[test]
    fn test_nested_executable_search() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("bin").join("x64");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("readme-loxone.txt"), b"text").unwrap();
        fs::write(bin.join("LoxoneConfigLauncher.exe"), b"MZ").unwrap();

        assert_eq!(
            find_executable(dir.path()).unwrap(),
            Some(bin.join("LoxoneConfigLauncher.exe"))
        );
    }

    #[test]
    fn test_missing_metadata_is_unknown() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("LoxoneConfig.exe"), b"MZ").unwrap();

        let probed = probe(dir.path()).unwrap().unwrap();
        assert_eq!(probed.version_display, UNKNOWN_VERSION);
        assert!(probed.version.is_unknown());
    }

    #[test]
    fn test_unreadable_metadata_is_recovered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("LoxoneConfig.exe"), b"MZ").unwrap();
        // A directory in place of the file makes the read fail with a real error
        fs::create_dir(dir.path().join(METADATA_FILE)).unwrap();

        assert!(matches!(read_metadata(dir.path()), MetadataRead::Failed(_)));
        let probed = probe(dir.path()).unwrap().unwrap();
        assert_eq!(probed.version_display, UNKNOWN_VERSION);
    }

    #[test]
    fn test_utf16_metadata() {
        let dir = tempdir().unwrap();
        let utf16: Vec<u8> = "Loxone Config 14.5.12.7"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        fs::write(dir.path().join(METADATA_FILE), utf16).unwrap();
        assert_eq!(detect_version(dir.path()), "14.5.12.7");
    }

    #[test]
    fn test_no_executable_means_no_installation() {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), "Loxone Config 16.0.6.10");
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();

        assert_eq!(probe(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_vanished_candidate_is_an_error() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("LoxoneConfig13");

        assert!(matches!(
            probe(&gone),
            Err(ProbeError::Enumerate { path, .. }) if path == gone
        ));
    }
}
