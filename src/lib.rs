//! Background self-update for .NET local and global tools
//!
//! A tool calls one of the [`Updater`] operations early in `main`, carries on
//! with its real work and awaits the returned [`UpdateHandle`] at the end:
//!
//! ```no_run
//! # async fn run() -> Result<(), tool_updater::UpdateError> {
//! use tool_updater::{UpdateOptions, Updater};
//!
//! let update = Updater::default().update_current(UpdateOptions::new())?;
//! // ... do the tool's work ...
//! let result = update.await;
//! println!("updated: {}", result.is_successful);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod invoke;
pub mod platform;
pub mod types;
pub mod updater;


pub use config::{load_settings, UpdaterSettings};
pub use context::{detect, ContextDetector};
pub use error::UpdateError;
pub use invoke::{UpdateCommand, UpdateInvoker};
pub use platform::CaseSensitivity;
pub use types::{InstallContext, ToolScope, UpdateOptions, UpdateResult};
pub use updater::{UpdateHandle, Updater};
pub use tokio_util::sync::CancellationToken;
