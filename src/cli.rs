//! Command-line interface definition for Teddy
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Teddy - a friendly conversational companion
///
/// Talk with the teddy bear by typing or speaking; it answers aloud and
/// checks in when things go quiet.
#[derive(Parser, Debug, Clone)]
#[command(name = "teddy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Teddy
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive conversation
    Chat {
        /// Do not speak replies aloud
        #[arg(long)]
        no_speech: bool,

        /// Override the idle window (seconds) before a proactive message
        #[arg(long)]
        idle_seconds: Option<u64>,

        /// Skip camera acquisition
        #[arg(long)]
        no_camera: bool,
    },

    /// Send a single message and print the reply
    Ask {
        /// Message to send
        prompt: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: DEFAULT_CONFIG_PATH.to_string(),
            verbose: false,
            command: Commands::Ask {
                prompt: String::new(),
            },
        }
    }
}
