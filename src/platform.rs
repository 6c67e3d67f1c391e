use std::path::{Component, Path};

/// Whether the host filesystem distinguishes `MyTool` from `mytool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    /// Case rules of the platform this binary was built for.
    pub fn host() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        }
    }

    pub fn str_eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => a == b || a.to_lowercase() == b.to_lowercase(),
        }
    }

    pub(crate) fn components_eq(self, a: &Component<'_>, b: &Component<'_>) -> bool {
        self.str_eq(&a.as_os_str().to_string_lossy(), &b.as_os_str().to_string_lossy())
    }

    /// Compares two paths component by component, so `a/b/` equals `a/b`.
    pub fn paths_eq(self, a: &Path, b: &Path) -> bool {
        let a: Vec<_> = a.components().collect();
        let b: Vec<_> = b.components().collect();
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| self.components_eq(x, y))
    }
}

/// File name of the package manager executable on this platform.
pub fn package_manager_executable() -> &'static str {
    if cfg!(windows) {
        "dotnet.exe"
    } else {
        "dotnet"
    }
}

/// Environment set on the package manager child process only.
///
/// See <https://learn.microsoft.com/dotnet/core/tools/dotnet-environment-variables>.
pub const PACKAGE_MANAGER_ENV: &[(&str, &str)] = &[
    ("DOTNET_CLI_TELEMETRY_OPTOUT", "1"),
    ("DOTNET_CLI_UI_LANGUAGE", "en-US"),
    ("DOTNET_MULTILEVEL_LOOKUP", "0"),
    ("DOTNET_NOLOGO", "1"),
];
