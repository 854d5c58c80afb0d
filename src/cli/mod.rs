pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Idempotently import package signing keys into a keyring.
#[derive(Parser, Debug)]
#[command(name = "keyring-sync", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the configuration file
    #[arg(long, global = true, env = "KEYRING_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the keyring store path from the configuration
    #[arg(long, global = true)]
    pub keyring: Option<PathBuf>,

    /// gpg binary to use
    #[arg(long, global = true)]
    pub gpg: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Show which keys would be imported, without fetching anything
    Check,

    /// Import every configured key that is missing from the keyring
    Import {
        /// Only process these key IDs (repeatable)
        #[arg(long = "key")]
        keys: Vec<String>,

        /// Continue with remaining keys after a failure
        #[arg(long)]
        keep_going: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List keys in the keyring
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
