use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::field::FieldSpec;

/// Command line arguments for xtui
#[derive(Parser, Debug)]
#[command(
    name = "xtui",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terminal UI toolkit for command line tools",
    long_about = "Interactive forms, paginated tables, progress loaders and a sequential package installer, usable as building blocks by other command line tools."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for non-interactive results
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Log file (defaults to the user cache directory)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install applications one after another
    #[command(alias = "app-install")]
    Install(InstallArgs),
    /// Interactive input form
    #[command(aliases = ["input-form", "input"])]
    Form(FormArgs),
    /// Spinner with a live message log
    #[command(alias = "loader-form")]
    Loader(LoaderArgs),
    /// Filterable, sortable, paginated table
    #[command(aliases = ["table-view", "view-table"])]
    Table(TableArgs),
    /// Installed Debian packages as a table
    Apps(AppsArgs),
    /// Follow a command's output next to a log directory tree
    Logs(LogsArgs),
    /// Check whether a TCP endpoint accepts connections
    TcpStatus(TcpStatusArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
    /// CSV output
    Csv,
}

#[derive(ClapArgs, Debug)]
pub struct InstallArgs {
    /// Application to install (repeatable; `repo/name` installs `name`)
    #[arg(short, long = "application", required = true)]
    pub applications: Vec<String>,

    /// Alternative apt root directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Automatic yes to prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Pass -qq to apt-get
    #[arg(long)]
    pub apt_quiet: bool,
}

#[derive(ClapArgs, Debug)]
pub struct FormArgs {
    /// Form title
    #[arg(short, long, default_value = "Input")]
    pub title: String,

    /// Field in compact form: `label[:kind][:required][:min=N][:max=N][:rule=R]`
    #[arg(short, long = "field")]
    pub fields: Vec<FieldSpec>,

    /// TOML or JSON form definition (`title` plus `[[fields]]`)
    #[arg(long, conflicts_with = "fields")]
    pub file: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct LoaderArgs {
    /// Message to show (repeatable, shown in order)
    #[arg(short, long = "message")]
    pub messages: Vec<String>,

    /// Delay between messages in milliseconds
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Spinner frames: dots, line, arc, bounce
    #[arg(short, long)]
    pub icon: Option<String>,

    /// Severity or style color override, `name=color` (repeatable)
    #[arg(long = "color", value_parser = parse_key_value)]
    pub colors: Vec<(String, String)>,

    /// Show a progress gauge counting the messages
    #[arg(long)]
    pub progress: bool,
}

#[derive(ClapArgs, Debug)]
pub struct TableArgs {
    /// CSV file with a header row
    #[arg(short, long, conflicts_with_all = ["headers", "rows"])]
    pub file: Option<PathBuf>,

    /// Comma-separated column headers
    #[arg(long, value_delimiter = ',')]
    pub headers: Vec<String>,

    /// Comma-separated row (repeatable)
    #[arg(short, long = "row")]
    pub rows: Vec<String>,

    /// Table title
    #[arg(short, long, default_value = "Table")]
    pub title: String,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Initial filter
    #[arg(long)]
    pub filter: Option<String>,

    /// Print the filtered rows instead of opening the table
    #[arg(long)]
    pub plain: bool,
}

#[derive(ClapArgs, Debug)]
pub struct AppsArgs {
    /// Name filter (case-insensitive substring)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Status filter: installed or residual
    #[arg(short, long)]
    pub status: Option<String>,

    /// Method filter
    #[arg(short, long)]
    pub method: Option<String>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Print the rows instead of opening the table
    #[arg(long)]
    pub plain: bool,
}

#[derive(ClapArgs, Debug)]
pub struct LogsArgs {
    /// Directory shown as a tree of *.log files
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Module highlight, `module=color` (repeatable)
    #[arg(long = "color", value_parser = parse_key_value)]
    pub colors: Vec<(String, String)>,

    /// Command whose output is followed
    #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct TcpStatusArgs {
    /// Endpoint as host:port
    pub target: String,

    /// Connection timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write an example project configuration
    Init {
        /// Project directory that receives .xtui/config.toml (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Validate the effective configuration
    Validate,
    /// Print the configuration file locations
    Path,
}

/// `key=value`, split on the first `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected name=color, got '{}'", s)),
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
