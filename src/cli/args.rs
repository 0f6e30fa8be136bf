//! Command-line argument definitions for the `daenet` tool.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::relay::{DeviceConfig, RelayBankState};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `DAEnetIP2@host(alias) = [1,0,...]`
    #[default]
    Human,
    /// Device snapshot as JSON.
    Json,
}

/// Control the relays of a DAEnetIP2 board over SNMPv1.
#[derive(Debug, Parser)]
#[command(name = "daenet", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub device: DeviceArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Which device to talk to.
#[derive(Debug, Parser)]
pub struct DeviceArgs {
    /// Device host name or address.
    #[arg(short = 'H', long = "host", default_value = "localhost")]
    pub host: String,

    /// SNMP agent port.
    #[arg(short = 'p', long = "port", default_value_t = 161)]
    pub port: u16,

    /// Read/write community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Name shown in output (default: DAEnetIP2).
    #[arg(short = 'a', long = "alias")]
    pub alias: Option<String>,

    /// Request timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "5", value_parser = parse_timeout)]
    pub timeout: Duration,
}

/// Parse a timeout in (fractional) seconds. Must be finite and positive.
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("invalid timeout '{}': expected seconds", s))?;
    if secs.is_nan() || secs <= 0.0 {
        return Err(format!("timeout must be positive, got '{}'", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout '{}': {}", s, e))
}

impl DeviceArgs {
    /// Get the timeout as a Duration.
    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            host: self.host.clone(),
            port: self.port,
            alias: self.alias.clone(),
            community: self.community.clone().into_bytes().into(),
            timeout: self.timeout_duration(),
            ..Default::default()
        }
    }
}

/// Operation to perform.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read the relay register.
    Get,
    /// Write all eight relays.
    Set {
        /// Bit list pin 1 first (`1,0,1,0,0,0,0,0`) or register mask (`5`, `0x05`).
        #[arg(value_name = "BITS|MASK")]
        state: RelayBankState,
    },
    /// Switch one relay on or off.
    Pin {
        /// Relay number, 1-8.
        #[arg(allow_negative_numbers = true)]
        pin: i64,
        /// 1 = on, 0 = off.
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Flip one relay.
    Toggle {
        /// Relay number, 1-8.
        #[arg(allow_negative_numbers = true)]
        pin: i64,
    },
}

/// Output control arguments.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format: human or json.
    #[arg(short = 'O', long = "format", default_value = "human")]
    pub format: OutputFormat,

    /// Enable debug logging (daenet=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (daenet=trace).
    #[arg(long = "trace")]
    pub trace: bool,
}

impl OutputArgs {
    /// Install a stderr `tracing` subscriber at the requested level.
    ///
    /// `RUST_LOG` is ignored; use `--debug` or `--trace`.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "daenet=trace"
        } else if self.debug {
            "daenet=debug"
        } else {
            "daenet=warn"
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }
}
