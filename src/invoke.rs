//! Running the package manager
//!
//! [`UpdateCommand`] composes `tool update` for an [`InstallContext`];
//! [`UpdateInvoker`] runs it as a child process, kills it when the caller
//! cancels and turns the exit status into an [`UpdateResult`]. Nothing in
//! here returns an error: every failure is an unsuccessful result.

use crate::config::UpdaterSettings;
use crate::platform::PACKAGE_MANAGER_ENV;
use crate::types::{InstallContext, ToolScope, UpdateResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// The command line for one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl UpdateCommand {
    pub fn new(program: impl Into<PathBuf>, context: &InstallContext, source: Option<&str>) -> Self {
        let mut args: Vec<OsString> = vec![
            "tool".into(),
            "update".into(),
            context.package_name.as_str().into(),
        ];

        match &context.scope {
            ToolScope::Local => {}
            ToolScope::Global { tool_path: None } => args.push("--global".into()),
            ToolScope::Global {
                tool_path: Some(path),
            } => {
                args.push("--tool-path".into());
                args.push(path.as_os_str().to_os_string());
            }
        }

        if let Some(source) = source {
            args.push("--add-source".into());
            args.push(source.into());
        }

        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn to_command(&self, working_dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(PACKAGE_MANAGER_ENV.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        cmd
    }
}

impl std::fmt::Display for UpdateCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateInvoker {
    package_manager: PathBuf,
    working_dir: Option<PathBuf>,
}

impl UpdateInvoker {
    pub fn new(package_manager: impl Into<PathBuf>) -> Self {
        Self {
            package_manager: package_manager.into(),
            working_dir: None,
        }
    }

    pub fn from_settings(settings: &UpdaterSettings) -> Self {
        Self {
            package_manager: settings.package_manager.clone(),
            working_dir: settings.working_dir.clone(),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn command(&self, context: &InstallContext, source: Option<&str>) -> UpdateCommand {
        UpdateCommand::new(&self.package_manager, context, source)
    }

    /// Runs one update to completion. Cancelling `cancel` kills the child.
    pub async fn invoke(
        &self,
        context: &InstallContext,
        source: Option<&str>,
        cancel: &CancellationToken,
    ) -> UpdateResult {
        let current_version = context.package_version.clone();

        if cancel.is_cancelled() {
            tracing::debug!("Update of {} cancelled before start", context.package_name);
            return UpdateResult::failed(current_version);
        }

        let command = self.command(context, source);
        tracing::debug!("Executing: {}", command);

        let mut child = match command.to_command(self.working_dir.as_deref()).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to start {}: {}", command.program().display(), e);
                return UpdateResult::failed(current_version);
            }
        };

        let status = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                tracing::info!("Update of {} cancelled, stopping package manager", context.package_name);
                terminate(&mut child).await
            }
        };

        match status {
            Ok(status) if status.success() => {
                tracing::info!("{} updated successfully", context.package_name);
                UpdateResult::succeeded(current_version)
            }
            Ok(status) => {
                tracing::warn!(
                    "Update of {} failed: package manager {}",
                    context.package_name,
                    describe_exit(&status)
                );
                UpdateResult::failed(current_version)
            }
            Err(e) => {
                tracing::warn!("Could not wait for package manager: {}", e);
                UpdateResult::failed(current_version)
            }
        }
    }
}

/// Kills and reaps the child. A child that already exited is not an error.
async fn terminate(child: &mut Child) -> std::io::Result<ExitStatus> {
    if let Err(e) = child.start_kill() {
        tracing::debug!("Ignoring error while killing package manager: {}", e);
    }
    child.wait().await
}

fn describe_exit(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}
