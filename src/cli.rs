use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Tagged builds report just the tag
    if let Some(tag) = option_env!("TOOL_UPDATER_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("TOOL_UPDATER_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("TOOL_UPDATER_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup so clap can hold a &'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "tool-updater")]
#[command(about = "Updates a .NET tool in the background while doing other work")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Additional NuGet package source to use for the update
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// JSON settings file (defaults plus DOTNET_*/NUGET_PACKAGES overrides if omitted)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Milliseconds of simulated work to do while the update runs
    #[arg(long, default_value_t = 1000, global = true)]
    pub work_ms: u64,

    /// Output format for the update result
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update the tool this binary was installed as
    Current,

    /// Update a global tool
    Global {
        /// NuGet package ID of the tool
        package: String,
        /// Custom install location passed to --tool-path
        #[arg(long)]
        tool_path: Option<PathBuf>,
    },

    /// Update a local tool from the manifest of the current directory
    Local {
        /// NuGet package ID of the tool
        package: String,
    },

    /// Show how this binary was installed
    Detect,

    /// Show the current version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
    Yaml,
}
