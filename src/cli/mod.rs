//! CLI interface for tiltmidi

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Motion controller to MIDI translation
#[derive(Parser)]
#[command(name = "tiltmidi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate device motion to MIDI
    Run {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log messages instead of opening a MIDI port
        #[arg(long)]
        dry_run: bool,
    },

    /// List available MIDI output ports
    Ports,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "tiltmidi.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
