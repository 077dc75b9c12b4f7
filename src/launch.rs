use crate::catalog::InstallationRecord;
use crate::error::LaunchError;
use std::ffi::OsStr;
use std::process::{Child, Command};

/// Start an installation with its folder as working directory.
pub fn launch(record: &InstallationRecord) -> Result<Child, LaunchError> {
    launch_with_args(record, std::iter::empty::<&OsStr>())
}

pub fn launch_with_args<I, S>(record: &InstallationRecord, args: I) -> Result<Child, LaunchError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let executable = record.executable_path();

    let mut cmd = Command::new(executable);
    cmd.args(args).current_dir(record.install_path());

    tracing::debug!(
        "Executing: {:?} in {}",
        cmd,
        record.install_path().display()
    );

    let child = cmd.spawn().map_err(|source| LaunchError {
        executable: executable.to_path_buf(),
        source,
    })?;

    tracing::info!(
        "Started Loxone Config {} (pid {})",
        record.version_display(),
        child.id()
    );
    Ok(child)
}
