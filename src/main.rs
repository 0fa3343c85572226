//! tiltmidi - Motion controller to MIDI translation

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tiltmidi::config::{self, TiltConfig, DEFAULT_CONFIG};
use tiltmidi::engine::{list_midi_ports, Engine, LogSink, MidiPlayer};
use tiltmidi::session::{spawn_console, Session};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config: config_path,
            dry_run,
        } => {
            let cfg = match config_path {
                Some(path) => config::load_config(&path)?,
                None if Path::new(DEFAULT_CONFIG).exists() => {
                    config::load_config(Path::new(DEFAULT_CONFIG))?
                }
                None => TiltConfig::default(),
            };
            setup_logging(cli.verbose, cfg.log_level.as_deref());
            for key in &cfg.corrections {
                warn!("runtime {} out of range in config, corrected", key);
            }

            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(run(cfg, dry_run));
            // The console reader blocks on stdin; don't wait for it
            rt.shutdown_background();
            result?;
        }

        Commands::Ports => {
            let ports = list_midi_ports()?;
            if ports.is_empty() {
                println!("No MIDI output ports found.");
            } else {
                println!("MIDI output ports:");
                for (i, port) in ports.iter().enumerate() {
                    println!("  {}: {}", i, port);
                }
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    for key in &cfg.corrections {
                        println!("  Note: runtime {} was out of range and will be clamped", key);
                    }
                    println!(
                        "  MIDI port: {}",
                        cfg.midi.port.as_deref().unwrap_or("(first available)")
                    );
                    println!("  Device: {:?}", cfg.device.kind);
                    println!("  Channel: {}", cfg.runtime.channel);
                    println!(
                        "  Bend: {} to {} on {}",
                        cfg.runtime.bend_min, cfg.runtime.bend_max, cfg.runtime.axis
                    );
                    let controls = cfg.build_controls();
                    if cfg.controls.is_empty() {
                        println!("  Controls: {} (preset {:?})", controls.len(), cfg.preset);
                    } else {
                        println!("  Controls: {}", controls.len());
                    }
                    for control in &controls {
                        println!(
                            "    - {} ({}) <- {}",
                            control.name(),
                            control.kind(),
                            control.input()
                        );
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../tiltmidi.example.yaml");

            if Path::new(DEFAULT_CONFIG).exists() {
                println!("{} already exists. Not overwriting.", DEFAULT_CONFIG);
            } else {
                std::fs::write(DEFAULT_CONFIG, example_config)?;
                println!("Created {} with example configuration.", DEFAULT_CONFIG);
            }
        }
    }

    Ok(())
}

async fn run(cfg: TiltConfig, dry_run: bool) -> Result<()> {
    let mut engine = Engine::new(cfg.runtime.clone(), cfg.build_controls());

    if dry_run {
        engine.connect(Box::new(LogSink));
    } else {
        match MidiPlayer::new(&cfg.midi) {
            Ok(player) => {
                info!("Sending MIDI to {}", player.port_name());
                engine.connect(Box::new(player));
            }
            Err(e) => warn!("MIDI output unavailable, messages will be dropped: {:#}", e),
        }
    }

    let session = Session::new(engine, cfg.build_source())
        .with_attach_interval(cfg.device.attach_interval());

    let (command_tx, command_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;
    spawn_console(command_tx);

    let engine = session.run(command_rx, shutdown_rx).await?;
    let stats = engine.stats();
    println!(
        "Processed {} snapshots ({} skipped), sent {} messages ({} dropped).",
        stats.cycles + stats.skipped,
        stats.skipped,
        stats.sent,
        stats.dropped
    );
    Ok(())
}

fn setup_logging(verbose: u8, configured: Option<&str>) {
    let level = match verbose {
        0 => configured
            .and_then(|level| level.parse().ok())
            .unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .init();
}
