use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use tool_updater::{Updater, UpdaterSettings};

/// A fake package manager living in a temp dir.
///
/// The updater runs `sh tool update ...` with the temp dir as working
/// directory, so `sh` reads the `tool` script below and sees the rest of the
/// command line as `$@`. The script never needs the exec bit.
pub struct StubPackageManager {
    pub dir: TempDir,
}

// Not every test binary uses every helper
#[allow(dead_code)]
impl StubPackageManager {
    /// A stub that records its arguments and environment, then exits with `exit_code`.
    pub fn exiting_with(exit_code: i32) -> Self {
        Self::with_body(&format!("exit {}", exit_code))
    }

    /// A stub that records its invocation and then blocks.
    pub fn hanging() -> Self {
        Self::with_body("exec sleep 30")
    }

    fn with_body(body: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let script = format!(
            "printf '%s\\n' \"$@\" > args.txt\nenv > env.txt\n{}\n",
            body
        );
        fs::write(dir.path().join("tool"), script).expect("Failed to write stub script");
        Self { dir }
    }

    pub fn settings(&self) -> UpdaterSettings {
        UpdaterSettings {
            package_manager: PathBuf::from("sh"),
            working_dir: Some(self.dir.path().to_path_buf()),
            ..UpdaterSettings::default()
        }
    }

    /// Writes [`Self::settings`] as a JSON file for the binary's `--settings`.
    pub fn settings_file(&self) -> PathBuf {
        let path = self.path().join("settings.json");
        let content = serde_json::to_string_pretty(&self.settings()).expect("Failed to serialize settings");
        fs::write(&path, content).expect("Failed to write settings file");
        path
    }

    pub fn updater(&self) -> Updater {
        Updater::new(&self.settings())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn was_invoked(&self) -> bool {
        self.path().join("args.txt").exists()
    }

    /// Arguments after `tool`, one per entry.
    pub fn args(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("args.txt"))
            .expect("Stub was not invoked")
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    pub fn env(&self) -> String {
        fs::read_to_string(self.path().join("env.txt")).expect("Stub was not invoked")
    }
}

/// Runs the `tool-updater` binary with no package manager overrides from the
/// outer environment.
#[allow(dead_code)]
pub fn tool_updater_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tool-updater"));
    cmd.env_remove("DOTNET_HOST_PATH")
        .env_remove("NUGET_PACKAGES")
        .env_remove("DOTNET_CLI_HOME")
        .env_remove("RUST_LOG");
    cmd
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
