//! Install context detection
//!
//! Works out how the running tool was installed by looking at where its
//! executable lives:
//! - `<packages-root>/<name>/<version>/...` is a local tool running from the
//!   global package cache
//! - `<tool-path>/.store/<name>/<version>/...` is a global tool; `<tool-path>`
//!   is reported only when it is not the default global location

use crate::config::UpdaterSettings;
use crate::error::UpdateError;
use crate::platform::CaseSensitivity;
use crate::types::{InstallContext, ToolScope};
use std::path::{Component, Path, PathBuf};

pub const STORE_DIR_NAME: &str = ".store";

#[derive(Debug, Clone)]
pub struct ContextDetector {
    packages_root: PathBuf,
    default_tool_path: Option<PathBuf>,
    case_sensitivity: CaseSensitivity,
}

impl ContextDetector {
    pub fn new(packages_root: impl Into<PathBuf>) -> Self {
        Self {
            packages_root: packages_root.into(),
            default_tool_path: None,
            case_sensitivity: CaseSensitivity::host(),
        }
    }

    pub fn from_settings(settings: &UpdaterSettings) -> Self {
        Self::new(&settings.global_packages_dir)
            .with_default_tool_path(&settings.default_tool_path)
    }

    pub fn with_default_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_tool_path = Some(path.into());
        self
    }

    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    pub fn detect(&self, executable: &Path) -> Result<InstallContext, UpdateError> {
        let segments: Vec<Component<'_>> = executable.components().collect();

        // Checked first: a cache path that also contains `.store` is still local
        if let Some(context) = self.match_local(&segments) {
            tracing::debug!("Detected local tool {} from {}", context, executable.display());
            return Ok(context);
        }

        if let Some(context) = self.match_global(&segments) {
            tracing::debug!("Detected global tool {} from {}", context, executable.display());
            return Ok(context);
        }

        Err(UpdateError::ContextDetection {
            executable: executable.to_path_buf(),
            packages_root: self.packages_root.clone(),
        })
    }

    fn match_local(&self, segments: &[Component<'_>]) -> Option<InstallContext> {
        let root: Vec<Component<'_>> = self.packages_root.components().collect();
        if root.is_empty() || segments.len() < root.len() {
            return None;
        }

        let (prefix, rest) = segments.split_at(root.len());
        let under_root = prefix
            .iter()
            .zip(root.iter())
            .all(|(a, b)| self.case_sensitivity.components_eq(a, b));
        if !under_root {
            return None;
        }

        let (name, version) = package_segments(rest)?;
        Some(InstallContext {
            scope: ToolScope::Local,
            package_name: name,
            package_version: Some(version),
        })
    }

    fn match_global(&self, segments: &[Component<'_>]) -> Option<InstallContext> {
        let store = segments.iter().position(|segment| {
            matches!(segment, Component::Normal(_))
                && self
                    .case_sensitivity
                    .str_eq(&segment.as_os_str().to_string_lossy(), STORE_DIR_NAME)
        })?;

        let (name, version) = package_segments(&segments[store + 1..])?;
        let install_root: PathBuf = segments[..store].iter().collect();

        let is_default = self
            .default_tool_path
            .as_deref()
            .is_some_and(|default| self.case_sensitivity.paths_eq(&install_root, default));
        let tool_path = if is_default || install_root.as_os_str().is_empty() {
            None
        } else {
            Some(install_root)
        };

        Some(InstallContext {
            scope: ToolScope::Global { tool_path },
            package_name: name,
            package_version: Some(version),
        })
    }
}

/// Name and version from `<name>/<version>/<at least one more segment>`.
fn package_segments(segments: &[Component<'_>]) -> Option<(String, String)> {
    match segments {
        [Component::Normal(name), Component::Normal(version), _, ..] => Some((
            name.to_string_lossy().to_string(),
            version.to_string_lossy().to_string(),
        )),
        _ => None,
    }
}

/// Detects with the host's case rules and the default global tool location
/// from [`UpdaterSettings::from_env`], the same one [`Updater::default`]
/// uses.
///
/// [`Updater::default`]: crate::Updater
pub fn detect(
    executable: impl AsRef<Path>,
    packages_root: impl AsRef<Path>,
) -> Result<InstallContext, UpdateError> {
    ContextDetector::new(packages_root.as_ref())
        .with_default_tool_path(UpdaterSettings::from_env().default_tool_path)
        .detect(executable.as_ref())
}
