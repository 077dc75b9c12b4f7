use crate::types::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // A tag at HEAD means a release build
    if let Some(tag) = option_env!("LOXLAUNCH_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("LOXLAUNCH_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("LOXLAUNCH_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "loxlaunch")]
#[command(about = "Pick and launch one of several installed Loxone Config versions")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding the LoxoneConfig* installation folders
    #[arg(long, global = true, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Without a command, show the interactive version menu
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installed versions, newest first
    List {
        /// Output format (plain, json, yaml)
        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Launch an installed version
    #[command(
        after_help = "Examples:\n  loxlaunch launch          # newest version\n  loxlaunch launch 2\n  loxlaunch launch 1 --wait -- /path/to/project.Loxone"
    )]
    Launch {
        /// Number shown by `loxlaunch list` (defaults to the newest)
        ordinal: Option<usize>,
        /// Wait for the program to exit and return its exit code
        #[arg(long)]
        wait: bool,
        /// Arguments passed to Loxone Config
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Manage loxlaunch preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the current version
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a preference (all when KEY is omitted)
    Get { key: Option<String> },
    /// Set a preference (e.g., 'install-path C:\Loxone')
    Set { key: String, value: String },
    /// Reset a preference to its default
    Unset { key: String },
    /// Show the preferences file
    Show {
        /// Output format (json, yaml, plain)
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}
