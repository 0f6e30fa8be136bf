//! daenet: control the P5 relays of a DAEnetIP2 board.

use std::process::ExitCode;

use clap::Parser;
use daenet::cli::args::{Cli, Command};
use daenet::cli::output::OutputContext;
use daenet::relay::RelayBankBuilder;
use daenet::{Event, RelayBank, Result};

async fn run(bank: &RelayBank, command: &Command) -> Result<()> {
    match command {
        Command::Get => {
            bank.get_state().await?;
        }
        Command::Set { state } => {
            bank.set_state(*state).await?;
        }
        Command::Pin { pin, value } => {
            bank.set_pin(*pin, *value).await?;
        }
        Command::Toggle { pin } => {
            bank.toggle_relay(*pin).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.output.init_tracing();

    let out = OutputContext::new(cli.output.format);
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();

    let connected = match RelayBankBuilder::from_config(cli.device.device_config()) {
        Ok(builder) => builder.connect().await,
        Err(e) => Err(e),
    };
    let bank = match connected {
        Ok(bank) => bank,
        Err(e) => {
            let _ = out.write_error(&mut stderr, &e);
            return ExitCode::FAILURE;
        }
    };

    let mut events = bank.subscribe();
    let result = run(&bank, &cli.command).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if !matches!(event, Event::Error(_)) {
            seen.push(event);
        }
    }

    match result {
        Ok(()) => {
            if let Err(e) = out.write_device(&mut stdout, &bank, &seen) {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let _ = out.write_error(&mut stderr, &e);
            ExitCode::FAILURE
        }
    }
}
