use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Where an installed tool lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolScope {
    /// Installed per-project and resolved from the global package cache.
    Local,
    /// Installed globally. `tool_path` is only set for a custom install root;
    /// `None` means the default global location.
    Global {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_path: Option<PathBuf>,
    },
}

/// How a tool was installed, as detected from its executable or supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallContext {
    pub scope: ToolScope,
    pub package_name: String,
    #[serde(default)]
    pub package_version: Option<String>,
}

impl InstallContext {
    pub fn local(package_name: impl Into<String>) -> Self {
        Self {
            scope: ToolScope::Local,
            package_name: package_name.into(),
            package_version: None,
        }
    }

    pub fn global(package_name: impl Into<String>, tool_path: Option<PathBuf>) -> Self {
        Self {
            scope: ToolScope::Global { tool_path },
            package_name: package_name.into(),
            package_version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.package_version = Some(version.into());
        self
    }

    pub fn is_local_tool(&self) -> bool {
        matches!(self.scope, ToolScope::Local)
    }

    /// Custom install root of a global tool, `None` for local tools and the default location.
    pub fn tool_path(&self) -> Option<&Path> {
        match &self.scope {
            ToolScope::Global { tool_path } => tool_path.as_deref(),
            ToolScope::Local => None,
        }
    }
}

impl fmt::Display for InstallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package_name)?;
        if let Some(version) = &self.package_version {
            write!(f, " (v{})", version)?;
        }
        match &self.scope {
            ToolScope::Local => write!(f, " [local]"),
            ToolScope::Global { tool_path: None } => write!(f, " [global]"),
            ToolScope::Global {
                tool_path: Some(path),
            } => write!(f, " [global: {}]", path.display()),
        }
    }
}

/// Terminal value of an update attempt.
///
/// `current_version` is the version known before the attempt, not the one
/// the package manager may have installed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub is_successful: bool,
    #[serde(default)]
    pub current_version: Option<String>,
}

impl UpdateResult {
    pub fn succeeded(current_version: Option<String>) -> Self {
        Self {
            is_successful: true,
            current_version,
        }
    }

    pub fn failed(current_version: Option<String>) -> Self {
        Self {
            is_successful: false,
            current_version,
        }
    }
}

/// Optional per-call arguments shared by every update operation.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Additional package source handed to the package manager.
    pub source: Option<String>,
    pub cancel: Option<CancellationToken>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }
}
