//! BER (Basic Encoding Rules) codec for SNMPv1.
//!
//! Covers the subset of X.690 that SNMPv1 messages use. Parsing is permissive
//! in the same places net-snmp is (non-minimal lengths, over-long integers).

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
