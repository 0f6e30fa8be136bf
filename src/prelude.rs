//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use daenet::prelude::*;
//! ```
//!
//! This imports the controller and its state types, events, the error types
//! and the [`oid!`] macro.

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::oid::Oid;
pub use crate::relay::{Event, Pin, RelayBank, RelayBankState};
pub use crate::value::Value;
pub use crate::varbind::VarBind;

#[doc(no_inline)]
pub use crate::oid;
