use crate::error::DiscoveryError;
use crate::platform::is_filesystem_root;
use std::fs;
use std::path::PathBuf;

/// Folder name fragments (lowercase) that mark a Loxone Config installation.
pub const FOLDER_MARKERS: [&str; 2] = ["loxoneconfig", "loxone config"];

pub fn is_candidate_name(name: &str) -> bool {
    let name = name.to_lowercase();
    FOLDER_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Enumerates candidate installation folders below a base directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    base: PathBuf,
}

impl Scanner {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Start a fresh pass over the base directory.
    ///
    /// The returned iterator is lazy and yields matching subdirectories in
    /// filesystem order. Call `scan` again to restart. A drive or filesystem
    /// root is refused, whichever source the base directory came from.
    pub fn scan(&self) -> Result<Candidates, DiscoveryError> {
        let metadata = fs::metadata(&self.base).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DiscoveryError::NotFound(self.base.clone())
            } else {
                DiscoveryError::Unreadable {
                    path: self.base.clone(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(DiscoveryError::NotADirectory(self.base.clone()));
        }
        if is_filesystem_root(&self.base) {
            return Err(DiscoveryError::FilesystemRoot(self.base.clone()));
        }

        let entries = fs::read_dir(&self.base).map_err(|e| DiscoveryError::Unreadable {
            path: self.base.clone(),
            source: e,
        })?;

        tracing::debug!("Scanning {} for installations", self.base.display());
        Ok(Candidates { entries })
    }
}

pub struct Candidates {
    entries: fs::ReadDir,
}

impl Iterator for Candidates {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !is_candidate_name(&name) {
                tracing::trace!("Ignoring '{}': name does not match", name);
                continue;
            }

            // Follows symlinks so linked installations are picked up too
            let path = entry.path();
            if path.is_dir() {
                tracing::debug!("Candidate: {}", path.display());
                return Some(path);
            }
        }
        None
    }
}
