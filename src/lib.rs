//! # daenet
//!
//! Async SNMPv1 controller for the eight relays on port P5 of a DAEnetIP2
//! board.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daenet::RelayBank;
//!
//! # async fn example() -> daenet::Result<()> {
//! let bank = RelayBank::builder(2)?
//!     .host("192.168.1.201")
//!     .alias("garage")
//!     .community(b"private")
//!     .connect()
//!     .await?;
//!
//! bank.initialize().await?;
//! println!("{bank}");
//!
//! // Relay 1 on, then flip relay 3
//! bank.set_pin(1, 1).await?;
//! bank.toggle_relay(3).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Events
//!
//! Every successful read or write, and every failed operation, is published
//! on a broadcast channel:
//!
//! ```rust,no_run
//! # use daenet::{Event, RelayBank};
//! # async fn example(bank: RelayBank) {
//! let mut events = bank.subscribe();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         Event::StateRead(state) | Event::StateSet(state) => println!("{state}"),
//!         Event::PinSet { pin, value } => println!("pin {pin} = {}", u8::from(value)),
//!         Event::Error(e) => eprintln!("{} failed: {}", e.operation, e.message),
//!     }
//! }
//! # }
//! ```
//!
//! ## Layers
//!
//! - [`relay`]: the controller, register codec and device OIDs
//! - [`client`]: minimal SNMPv1 GET/SET client
//! - [`transport`]: UDP transport (and a mock behind the `testing` feature)
//! - [`ber`], [`oid`], [`value`], [`varbind`], [`pdu`], [`message`]: wire format

pub mod ber;
pub mod client;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod relay;
pub mod transport;
pub mod value;
pub mod varbind;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use client::{Client, ClientConfig};
pub use error::{Error, ErrorKind, Result};
pub use oid::Oid;
pub use relay::{
    DeviceConfig, DeviceIdentity, Event, Pin, RelayBank, RelayBankBuilder, RelayBankState,
    Snapshot,
};
pub use transport::{Transport, UdpTransport};
pub use value::Value;
pub use varbind::VarBind;
