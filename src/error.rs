use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The scan root itself is unusable. Distinct from "no matching folders".
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Installation directory '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("'{}' is a drive or filesystem root; choose the folder that holds the installations", .0.display())]
    FilesystemRoot(PathBuf),

    #[error("Cannot read installation directory '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Cannot list contents of '{}': {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

#[derive(Error, Debug)]
#[error("Failed to start '{}': {source}", executable.display())]
pub struct LaunchError {
    pub executable: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathValidationError {
    #[error("Path '{}' does not exist", .0.display())]
    Missing(PathBuf),

    #[error("Path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Path '{}' is a drive or filesystem root; choose the folder that holds the installations", .0.display())]
    Root(PathBuf),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid version '{input}': {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: &'static str,
}
