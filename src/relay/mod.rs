//! DAEnetIP2 P5 relay bank.
//!
//! [`RelayBank`] wraps an SNMPv1 [`Client`](crate::Client) bound to one
//! device and exposes the eight relays of port P5:
//!
//! - [`get_state`](RelayBank::get_state) / [`set_state`](RelayBank::set_state)
//!   read and write the whole register,
//! - [`set_pin`](RelayBank::set_pin) writes a single relay,
//! - [`toggle_relay`](RelayBank::toggle_relay) flips one relay after a fresh
//!   read.
//!
//! Results are returned to the caller and also published as [`Event`]s to
//! every [`subscribe`](RelayBank::subscribe)r.

mod bank;
mod builder;
mod device;
mod event;
pub mod mib;
pub mod register;

pub use bank::{RelayBank, Snapshot};
pub use builder::RelayBankBuilder;
pub use device::{DeviceConfig, DeviceIdentity, SUPPORTED_VERSION, check_version};
pub use event::{ErrorEvent, Event, Operation};
pub use register::{PIN_COUNT, Pin, RelayBankState};
