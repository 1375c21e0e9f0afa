use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use xrdnav_core::{DEFAULT_BASE_PATH, DEFAULT_MAX_DEPTH};

/// xrdnav - browse and clean up a namespace served by a storage redirector
#[derive(Parser, Debug)]
#[command(name = "xrdnav", version)]
pub struct Cli {
    /// Local mount point serving the redirector namespace
    #[arg(short = 'r', long, env = "XRDNAV_ROOT", value_name = "DIR")]
    pub root: PathBuf,

    /// User name; mutations are only allowed on paths containing it
    #[arg(short = 'u', long, env = "XRDNAV_USER")]
    pub user: String,

    /// Base path every remote argument is relative to
    #[arg(short = 'b', long, env = "XRDNAV_BASEPATH", default_value = DEFAULT_BASE_PATH)]
    pub basepath: String,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Deepest directory level recursive walks may reach
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check that the namespace is reachable
    Ping,
    /// List a directory (a file path prints itself)
    Ls {
        #[arg(default_value = "")]
        path: String,
    },
    /// Show the metadata of a file or directory
    Stat { path: String },
    /// Show the metadata of every entry in a directory
    StatDir {
        #[arg(default_value = "")]
        path: String,
    },
    /// Print the total size of a file or directory tree
    Size {
        #[arg(default_value = "")]
        path: String,
    },
    /// Print the size of every entry in a directory, largest first
    Content {
        #[arg(default_value = "")]
        path: String,
    },
    /// Delete a file
    Rm {
        path: String,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete a directory and everything below it
    RmDir {
        path: String,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete several files or directories
    Purge {
        #[arg(required = true)]
        paths: Vec<String>,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Move or rename; the destination has to be given explicitly
    Mv { source: String, dest: String },
    /// Create a directory and all missing parents
    Mkdir { path: String },
    /// Copy a local file to the namespace; DEST has to name the file
    CopyTo { local: PathBuf, dest: String },
    /// Copy a file from the namespace; LOCAL has to name the file
    CopyFrom { source: String, local: PathBuf },
    /// Write the entries of a directory to list<dir>.txt
    FileList {
        #[arg(default_value = "")]
        path: String,
        /// Skip entries whose path contains this text (e.g. ".log")
        #[arg(short = 'e', long, default_value = "")]
        exclude: String,
        /// Directory the list file is written to
        #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
