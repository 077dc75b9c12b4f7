use std::path::{Path, PathBuf};

/// Where Loxone Config versions are installed when nothing else is configured.
pub fn default_install_root() -> PathBuf {
    if cfg!(windows) {
        let program_files = std::env::var_os("ProgramFiles(x86)")
            .or_else(|| std::env::var_os("ProgramFiles"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));
        program_files.join("Loxone")
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("loxone")
    }
}

/// True for `/`, `C:\` and their verbatim forms.
pub fn is_filesystem_root(path: &Path) -> bool {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved.parent().is_none()
}

/// Whether a file could be started as a program on this platform.
pub fn is_launchable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    if ext == "exe" {
        return true;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if matches!(ext.as_str(), "so" | "dylib" | "dll") {
            return false;
        }
        if let Ok(metadata) = path.metadata() {
            return metadata.permissions().mode() & 0o111 != 0;
        }
    }

    false
}
