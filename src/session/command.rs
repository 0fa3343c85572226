//! Console commands

use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{Bound, ConfigEvent, ConfigKey};
use crate::error::CommandError;

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Change a runtime setting
    Config(ConfigEvent),
    /// Capture the next sample into a bend bound
    Calibrate(Bound),
    /// Log current settings and statistics
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let word = parts.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let value = parts.collect::<Vec<_>>().join(" ");

        match word.as_str() {
            "status" => return Ok(Command::Status),
            "quit" | "exit" => return Ok(Command::Quit),
            "calibrate" | "cal" => {
                if value.is_empty() {
                    return Err(CommandError::MissingValue(word));
                }
                return value
                    .parse()
                    .map(Command::Calibrate)
                    .map_err(CommandError::InvalidBound);
            }
            _ => {}
        }

        let key: ConfigKey = word.parse().map_err(|_| CommandError::Unknown(word.clone()))?;
        if value.is_empty() {
            return Err(CommandError::MissingValue(word));
        }
        Ok(Command::Config(ConfigEvent::new(key, value)))
    }
}

/// Read commands from stdin until EOF or the receiver goes away
pub fn spawn_console(sender: mpsc::Sender<Command>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Console read failed: {}", e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    if sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Ignoring '{}': {}", line.trim(), e),
            }
        }
        debug!("Console closed");
    })
}
