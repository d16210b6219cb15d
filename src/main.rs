// src/main.rs
//! NMEA Relay - stream generated NMEA telemetry to a serial device

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use nmea_relay::{
    display::terminal::{self, ConsoleReporter},
    session::{self, QUIT_COMMAND},
    telemetry, RelayConfig, RelayError, RelaySession, SentenceKind, SessionTiming,
    TransmitPlan,
};
use std::{io, path::PathBuf};
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "nmea-relay", version, about = "Stream NMEA telemetry to a serial device")]
struct Cli {
    /// Config file (defaults to ~/.config/nmea-relay/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send the telemetry schedule and print device replies
    Run {
        #[command(flatten)]
        port: PortArgs,
        /// Number of transmit iterations
        #[arg(long)]
        iterations: Option<usize>,
        /// Milliseconds between iterations
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Milliseconds to wait for replies after the last write
        #[arg(long)]
        drain_ms: Option<u64>,
        /// Sentence kinds to send, e.g. rmc,gga,vtg
        #[arg(long, value_delimiter = ',')]
        sentences: Option<Vec<SentenceKind>>,
    },
    /// Forward typed lines to the device until $quit()
    Interactive {
        #[command(flatten)]
        port: PortArgs,
    },
    /// List serial ports
    Ports,
    /// Print the sentences for the first scheduled sample without opening a port
    Encode {
        #[arg(long, value_delimiter = ',')]
        sentences: Option<Vec<SentenceKind>>,
    },
    /// Write the effective configuration to the config file
    SaveConfig {
        #[command(flatten)]
        port: PortArgs,
    },
}

#[derive(Args)]
struct PortArgs {
    /// Serial port, e.g. COM3 or /dev/ttyUSB0
    #[arg(short, long)]
    port: Option<String>,
    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,
}

impl PortArgs {
    fn apply(self, config: &mut RelayConfig) {
        let port = self.port.unwrap_or_else(|| config.serial_port.clone());
        let baud = self.baud.unwrap_or(config.serial_baudrate);
        config.update_serial(port, baud);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => RelayConfig::get_config_path()?,
    };
    let mut config = RelayConfig::load_from(&config_path)?;

    match cli.command {
        Command::Run {
            port,
            iterations,
            interval_ms,
            drain_ms,
            sentences,
        } => {
            port.apply(&mut config);
            if let Some(iterations) = iterations {
                config.iterations = iterations;
            }
            if let Some(interval_ms) = interval_ms {
                config.interval_ms = interval_ms;
            }
            if let Some(drain_ms) = drain_ms {
                config.drain_ms = drain_ms;
            }
            if let Some(sentences) = sentences {
                config.sentences = sentences;
            }
            config.validate()?;

            let plan = TransmitPlan::telemetry(
                config.schedule()?,
                config.sentences.clone(),
                config.profile.clone(),
            );
            relay(&config, plan).await
        }
        Command::Interactive { port } => {
            port.apply(&mut config);
            println!("Type lines to send, {} to finish", QUIT_COMMAND);
            let plan = TransmitPlan::console(BufReader::new(tokio::io::stdin()));
            relay(&config, plan).await
        }
        Command::Ports => {
            let ports = session::available_ports()?;
            terminal::print_ports(&mut io::stdout(), &ports)?;
            Ok(())
        }
        Command::Encode { sentences } => {
            let kinds = sentences.unwrap_or_else(|| SentenceKind::all().to_vec());
            let schedule = config.schedule()?;
            let sentences = telemetry::render_sample(
                schedule.sample_at(0),
                &kinds,
                &config.profile,
                &Utc::now(),
            );
            terminal::print_sentences(&mut io::stdout(), &sentences)?;
            Ok(())
        }
        Command::SaveConfig { port } => {
            port.apply(&mut config);
            config.save_to(&config_path)?;
            println!("Saved configuration to {}", config_path.display());
            Ok(())
        }
    }
}

/// Open the configured port and run one session to completion
async fn relay(config: &RelayConfig, plan: TransmitPlan) -> anyhow::Result<()> {
    let connection = match session::open_serial(&config.serial_port, config.serial_baudrate) {
        Ok(connection) => connection,
        Err(e @ RelayError::PortUnavailable { .. }) => {
            eprintln!("{}", e);
            let ports = session::available_ports().unwrap_or_default();
            terminal::print_ports(&mut io::stdout(), &ports)?;
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let timing = SessionTiming::new(config.interval(), config.drain());
    let active = RelaySession::new(connection, plan, timing).start(ConsoleReporter::new());

    let report = tokio::select! {
        report = active.await_completion() => report,
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
            return Ok(());
        }
    };

    let (sent, received) = report.into_result().context("relay session failed")?;
    tracing::info!("Sent {} sentences, received {} lines", sent, received);
    Ok(())
}
