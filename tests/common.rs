use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Not every test binary uses every helper
#[allow(dead_code)]
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub install_root: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config").join("preferences.json");
        let install_root = temp_dir.path().join("Loxone");
        fs::create_dir_all(&install_root).expect("Failed to create install root");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_loxlaunch"));

        Self {
            temp_dir,
            config_path,
            install_root,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("LOXLAUNCH_CONFIG_PATH", &self.config_path);
        cmd.env("LOXLAUNCH_INSTALL_PATH", &self.install_root);
        cmd.env_remove("RUST_LOG");
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("XDG_DATA_HOME", self.temp_dir.path().join("data"));
        cmd.env("XDG_CONFIG_HOME", self.temp_dir.path().join("xdg-config"));
        cmd
    }

    pub fn write_preferences(&self, content: &str) {
        fs::create_dir_all(self.config_path.parent().unwrap()).unwrap();
        fs::write(&self.config_path, content).expect("Failed to write preferences");
    }

    /// Create `<root>/<folder>` with an executable and an uninstall log.
    pub fn install(&self, folder: &str, version: Option<&str>) -> PathBuf {
        let dir = self.install_root.join(folder);
        fs::create_dir_all(&dir).expect("Failed to create installation");
        write_launcher(&dir);
        if let Some(version) = version {
            fs::write(
                dir.join("unins000.dat"),
                format!("Inno Setup Uninstall Log\0Loxone Config {}\0", version),
            )
            .expect("Failed to write uninstall log");
        }
        dir
    }
}

/// A program that records its working directory in `launched.txt`.
#[cfg(unix)]
fn write_launcher(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let exe = dir.join("LoxoneConfig");
    fs::write(&exe, "#!/bin/sh\npwd > launched.txt\n").expect("Failed to write launcher");
    let mut perms = fs::metadata(&exe).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&exe, perms).unwrap();
}

#[cfg(not(unix))]
fn write_launcher(dir: &Path) {
    fs::write(dir.join("LoxoneConfig.exe"), b"MZ").expect("Failed to write launcher");
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "Command unexpectedly succeeded\nstdout: {}",
            self.stdout
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
