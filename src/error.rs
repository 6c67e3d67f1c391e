use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported synchronously by the update operations.
///
/// Anything that can go wrong once the package manager is running
/// (spawn failure, non-zero exit, cancellation) is not an error: it resolves
/// to an unsuccessful [`UpdateResult`](crate::UpdateResult) instead.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(
        "Could not determine how '{}' was installed: it is neither inside the package cache '{}' nor inside a '.store' directory",
        executable.display(),
        packages_root.display()
    )]
    ContextDetection {
        executable: PathBuf,
        packages_root: PathBuf,
    },

    #[error("Could not locate the running executable: {0}")]
    CurrentExe(#[source] io::Error),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    #[error("The update was cancelled before it started")]
    Cancelled,

    #[error("Updates must be started from within a Tokio runtime")]
    NoRuntime,
}
