//! Output formatting for the `daenet` tool.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::Error;
use crate::relay::{Event, Operation, RelayBank, Snapshot};
use crate::transport::Transport;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(rename = "DAEnetIP")]
    device: &'a Snapshot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<JsonEvent>,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent {
    StateRead { status: [u8; 8] },
    StateSet { status: [u8; 8] },
    PinSet { pin: u8, value: u8 },
    Error { operation: Operation, kind: String, message: String },
}

impl From<&Event> for JsonEvent {
    fn from(event: &Event) -> Self {
        match event {
            Event::StateRead(state) => Self::StateRead {
                status: state.as_bits(),
            },
            Event::StateSet(state) => Self::StateSet {
                status: state.as_bits(),
            },
            Event::PinSet { pin, value } => Self::PinSet {
                pin: pin.number(),
                value: u8::from(*value),
            },
            Event::Error(e) => Self::Error {
                operation: e.operation,
                kind: e.kind.to_string(),
                message: e.message.clone(),
            },
        }
    }
}

#[derive(Serialize)]
struct JsonError {
    error: JsonErrorBody,
}

#[derive(Serialize)]
struct JsonErrorBody {
    kind: String,
    message: String,
}

/// Formats results in the selected format.
pub struct OutputContext {
    pub format: OutputFormat,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the device and the events the command produced.
    pub fn write_device<T: Transport>(
        &self,
        w: &mut impl Write,
        bank: &RelayBank<T>,
        events: &[Event],
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                for event in events {
                    if let Event::PinSet { pin, value } = event {
                        writeln!(w, "pin {} = {}", pin, u8::from(*value))?;
                    }
                }
                writeln!(w, "{}", bank)
            }
            OutputFormat::Json => {
                let snapshot = bank.snapshot();
                let report = JsonReport {
                    device: &snapshot,
                    events: events.iter().map(JsonEvent::from).collect(),
                };
                serde_json::to_writer_pretty(&mut *w, &report).map_err(io::Error::other)?;
                writeln!(w)
            }
        }
    }

    /// Print an error.
    pub fn write_error(&self, w: &mut impl Write, error: &Error) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => writeln!(w, "Error: {}", error),
            OutputFormat::Json => {
                let body = JsonError {
                    error: JsonErrorBody {
                        kind: error.kind().to_string(),
                        message: error.to_string(),
                    },
                };
                serde_json::to_writer(&mut *w, &body).map_err(io::Error::other)?;
                writeln!(w)
            }
        }
    }
}
