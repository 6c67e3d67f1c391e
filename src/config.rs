use crate::platform::package_manager_executable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const NUGET_PACKAGES_ENV: &str = "NUGET_PACKAGES";
pub const DOTNET_HOST_PATH_ENV: &str = "DOTNET_HOST_PATH";
pub const DOTNET_CLI_HOME_ENV: &str = "DOTNET_CLI_HOME";

/// Configuration the [`Updater`](crate::Updater) is built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdaterSettings {
    /// Package manager executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_package_manager")]
    pub package_manager: PathBuf,
    /// Root of the global package cache that local tools run from.
    #[serde(default = "default_global_packages_dir")]
    pub global_packages_dir: PathBuf,
    /// Where global tools go when no `--tool-path` is given.
    #[serde(default = "default_tool_path")]
    pub default_tool_path: PathBuf,
    /// Working directory of the package manager. Local tools are resolved from
    /// the tool manifest of this directory; `None` inherits ours.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_package_manager() -> PathBuf {
    PathBuf::from(package_manager_executable())
}

fn default_global_packages_dir() -> PathBuf {
    home_dir().join(".nuget").join("packages")
}

fn default_tool_path() -> PathBuf {
    home_dir().join(".dotnet").join("tools")
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            global_packages_dir: default_global_packages_dir(),
            default_tool_path: default_tool_path(),
            working_dir: None,
        }
    }
}

impl UpdaterSettings {
    /// Defaults with the package manager's own environment variables applied.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Applies the overrides the package manager itself honours. `lookup`
    /// stands in for `std::env::var` so the mapping can be tested in isolation.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(packages) = lookup(NUGET_PACKAGES_ENV) {
            self.global_packages_dir = PathBuf::from(packages);
        }

        if let Some(host) = lookup(DOTNET_HOST_PATH_ENV) {
            self.package_manager = PathBuf::from(host);
        }

        if let Some(cli_home) = lookup(DOTNET_CLI_HOME_ENV) {
            self.default_tool_path = PathBuf::from(cli_home).join(".dotnet").join("tools");
        }
    }
}

/// Reads settings from a JSON file; a missing file yields the defaults.
/// Environment overrides are applied on top either way.
pub fn load_settings(path: &Path) -> Result<UpdaterSettings> {
    let mut settings = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings file at {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Could not parse settings file {} as JSON", path.display()))?
    } else {
        tracing::debug!("Settings file {} not found, using defaults", path.display());
        UpdaterSettings::default()
    };

    settings.apply_env_overrides(|key| std::env::var(key).ok());
    tracing::debug!("Updater settings: {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = UpdaterSettings::default();
        settings.apply_env_overrides(lookup_from(&[
            (NUGET_PACKAGES_ENV, "/cache/packages"),
            (DOTNET_HOST_PATH_ENV, "/usr/share/dotnet/dotnet"),
            (DOTNET_CLI_HOME_ENV, "/srv/cli"),
        ]));

        assert_eq!(settings.global_packages_dir, PathBuf::from("/cache/packages"));
        assert_eq!(settings.package_manager, PathBuf::from("/usr/share/dotnet/dotnet"));
        assert_eq!(
            settings.default_tool_path,
            PathBuf::from("/srv/cli").join(".dotnet").join("tools")
        );
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut settings = UpdaterSettings::default();
        settings.apply_env_overrides(lookup_from(&[(NUGET_PACKAGES_ENV, "  ")]));
        assert_eq!(settings, UpdaterSettings::default());
    }

    #[test]
    fn test_partial_settings_file() {
        let settings: UpdaterSettings =
            serde_json::from_str(r#"{ "working_dir": "/work/project" }"#).unwrap();
        assert_eq!(settings.working_dir, Some(PathBuf::from("/work/project")));
        assert_eq!(settings.package_manager, default_package_manager());
        assert!(settings.global_packages_dir.ends_with(".nuget/packages"));
    }
}
