use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::default_config_path;
use crate::logging::default_log_dir;
use crate::store::default_mapping_path;

/// Mirror "This Week" cards from every Trello board onto a weekly milestone board
#[derive(Parser, Debug)]
#[command(name = "weekly-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (TOML, or JSON when it ends in .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the card mapping file
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Directory for per-run log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Mirror labelled cards, sync completion and clean up (default)
    Sync,
    /// Create the trigger label on every board that lacks it
    SetupLabel,
}

impl Command {
    pub fn log_prefix(self) -> &'static str {
        match self {
            Command::Sync => "weekly_sync",
            Command::SetupLabel => "label_setup",
        }
    }
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Sync)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.mapping.clone().unwrap_or_else(default_mapping_path)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}
