use crate::config::UpdaterSettings;
use crate::context::ContextDetector;
use crate::error::UpdateError;
use crate::invoke::UpdateInvoker;
use crate::types::{InstallContext, UpdateOptions, UpdateResult};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Starts package manager updates in the background.
///
/// Every operation validates its input, hands the update to a Tokio task and
/// returns an [`UpdateHandle`] straight away. Only misuse and unsupported
/// install layouts are reported as [`UpdateError`]s; once the task is running
/// every outcome is an [`UpdateResult`].
#[derive(Debug, Clone)]
pub struct Updater {
    detector: ContextDetector,
    invoker: UpdateInvoker,
}

impl Default for Updater {
    fn default() -> Self {
        Self::new(&UpdaterSettings::from_env())
    }
}

impl Updater {
    pub fn new(settings: &UpdaterSettings) -> Self {
        Self {
            detector: ContextDetector::from_settings(settings),
            invoker: UpdateInvoker::from_settings(settings),
        }
    }

    pub fn with_detector(mut self, detector: ContextDetector) -> Self {
        self.detector = detector;
        self
    }

    /// How the running executable was installed.
    pub fn detect_current(&self) -> Result<InstallContext, UpdateError> {
        let executable = std::env::current_exe().map_err(UpdateError::CurrentExe)?;
        self.detect(&executable)
    }

    pub fn detect(&self, executable: &Path) -> Result<InstallContext, UpdateError> {
        self.detector.detect(executable)
    }

    /// Updates the tool that is currently running.
    ///
    /// If `options` is already cancelled the returned handle is complete and
    /// unsuccessful; nothing is spawned.
    pub fn update_current(&self, options: UpdateOptions) -> Result<UpdateHandle, UpdateError> {
        let context = self.detect_current()?;
        tracing::info!("Updating current tool {}", context);

        if options.is_cancelled() {
            return Ok(UpdateHandle::ready(UpdateResult::failed(
                context.package_version,
            )));
        }

        self.spawn(context, options)
    }

    /// Updates a global tool, installed under `tool_path` or the default location when `None`.
    pub fn update_global(
        &self,
        package_name: &str,
        tool_path: Option<&Path>,
        options: UpdateOptions,
    ) -> Result<UpdateHandle, UpdateError> {
        let context = InstallContext::global(package_name, tool_path.map(Path::to_path_buf));
        self.update(context, options)
    }

    pub fn update_local(
        &self,
        package_name: &str,
        options: UpdateOptions,
    ) -> Result<UpdateHandle, UpdateError> {
        self.update(InstallContext::local(package_name), options)
    }

    /// Updates an already known install context without detection.
    pub fn update(
        &self,
        context: InstallContext,
        options: UpdateOptions,
    ) -> Result<UpdateHandle, UpdateError> {
        if context.package_name.trim().is_empty() {
            return Err(UpdateError::InvalidArgument {
                name: "package_name",
                reason: "must not be empty",
            });
        }

        if options.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        tracing::info!("Updating {}", context);
        self.spawn(context, options)
    }

    fn spawn(
        &self,
        context: InstallContext,
        options: UpdateOptions,
    ) -> Result<UpdateHandle, UpdateError> {
        let runtime = Handle::try_current().map_err(|_| UpdateError::NoRuntime)?;

        let invoker = self.invoker.clone();
        let UpdateOptions { source, cancel } = options;
        let cancel = cancel.unwrap_or_else(CancellationToken::new);

        let task = runtime.spawn(async move {
            invoker.invoke(&context, source.as_deref(), &cancel).await
        });

        Ok(UpdateHandle {
            state: HandleState::Running(task),
        })
    }
}

/// A pending update. Await it for the [`UpdateResult`], or drop it to let the
/// update finish unobserved.
#[derive(Debug)]
pub struct UpdateHandle {
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Ready(Option<UpdateResult>),
    Running(JoinHandle<UpdateResult>),
}

impl UpdateHandle {
    fn ready(result: UpdateResult) -> Self {
        Self {
            state: HandleState::Ready(Some(result)),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) => true,
            HandleState::Running(task) => task.is_finished(),
        }
    }
}

impl Future for UpdateHandle {
    type Output = UpdateResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            HandleState::Ready(result) => Poll::Ready(result.take().unwrap_or_default()),
            HandleState::Running(task) => match Pin::new(task).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(e)) => {
                    tracing::warn!("Update task did not complete: {}", e);
                    Poll::Ready(UpdateResult::failed(None))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn updater() -> Updater {
        let settings = UpdaterSettings {
            package_manager: PathBuf::from("/nonexistent/package-manager"),
            ..UpdaterSettings::default()
        };
        Updater::new(&settings)
    }

    #[tokio::test]
    async fn test_empty_package_name_is_rejected() {
        let err = updater().update_local("", UpdateOptions::new()).unwrap_err();
        assert!(matches!(err, UpdateError::InvalidArgument { name: "package_name", .. }));

        let err = updater()
            .update_global("   ", None, UpdateOptions::new())
            .unwrap_err();
        assert!(matches!(err, UpdateError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_at_entry_is_an_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = updater()
            .update_global("mytool", None, UpdateOptions::new().with_cancellation(cancel))
            .unwrap_err();
        assert!(matches!(err, UpdateError::Cancelled));
    }

    #[test]
    fn test_outside_runtime() {
        let err = updater()
            .update_local("mytool", UpdateOptions::new())
            .unwrap_err();
        assert!(matches!(err, UpdateError::NoRuntime));
    }

    #[tokio::test]
    async fn test_spawn_failure_resolves_unsuccessful() {
        let handle = updater()
            .update_global("mytool", None, UpdateOptions::new())
            .unwrap();
        assert!(!handle.await.is_successful);
    }

    #[tokio::test]
    async fn test_ready_handle() {
        let handle = UpdateHandle::ready(UpdateResult::failed(Some("1.0.0".to_string())));
        assert!(handle.is_finished());
        assert_eq!(handle.await.current_version.as_deref(), Some("1.0.0"));
    }
}
