//! Error types for daenet.
//!
//! Every failure falls into one of three kinds:
//!
//! - [`Error::Transport`]: the request never produced a usable response
//!   (socket errors, timeouts, undecodable or mismatched responses).
//! - [`Error::DeviceProtocol`]: a response arrived but the device flagged the
//!   operation as rejected or returned something that is not a relay value.
//! - [`Error::InvalidArgument`]: the caller supplied input that is rejected
//!   locally, before any request is sent.

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Invalid BER length encoding.
    InvalidLength,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Integer value overflow.
    IntegerOverflow,
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Unknown PDU type.
    UnknownPduType(u8),
    /// NULL with non-zero length.
    InvalidNull,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// Constructed OCTET STRING not supported.
    ConstructedOctetString,
    /// OID exceeds maximum arc count during decode.
    OidTooLong { count: usize, max: usize },
    /// Response carried no variable bindings.
    EmptyResponse,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::ConstructedOctetString => {
                write!(f, "constructed OCTET STRING (0x24) not supported")
            }
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::EmptyResponse => write!(f, "response has no variable bindings"),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
        }
    }
}

/// SNMPv1 error status codes (RFC 1157).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    /// Status code outside the SNMPv1 range.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    DeviceProtocol,
    InvalidArgument,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::DeviceProtocol => write!(f, "device protocol"),
            Self::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

/// Network or session level failure: no usable response was obtained.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// I/O error during communication.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Target address could not be resolved.
    #[error("could not resolve address '{target}'")]
    Resolve {
        target: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// No response within the request timeout.
    #[error("timeout after {elapsed:?} waiting for {target} (request_id={request_id})")]
    Timeout {
        target: SocketAddr,
        elapsed: Duration,
        request_id: i32,
    },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// Response was not an SNMPv1 message.
    #[error("version mismatch: expected SNMPv1, got version {actual}")]
    VersionMismatch { actual: i32 },
}

/// The device answered, but rejected the request or returned an unusable value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DeviceProtocolError {
    /// Non-zero error-status in the response PDU.
    #[error("SNMP error from {target}: {status} at index {index}{}", oid.as_ref().map(|o| format!(" ({})", o)).unwrap_or_default())]
    Status {
        target: SocketAddr,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// Varbind carries an exception value instead of data.
    #[error("{oid}: {exception}")]
    Exception { oid: Oid, exception: &'static str },

    /// Varbind carries a value of the wrong type.
    #[error("{oid}: expected INTEGER, got {actual}")]
    UnexpectedType { oid: Oid, actual: &'static str },

    /// Pin echo outside {0, 1}.
    #[error("{oid}: pin value {value} is not 0 or 1")]
    PinValueOutOfRange { oid: Oid, value: i32 },

    /// Response varbind names a different object than requested.
    #[error("response OID {actual} does not match requested {expected}")]
    OidMismatch { expected: Oid, actual: Oid },
}

/// Caller input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidArgument {
    /// Pin number outside 1..=8.
    #[error("pin {0} out of range 1..=8")]
    Pin(i64),

    /// Pin value other than 0 or 1.
    #[error("pin value {0} is not 0 or 1")]
    PinValue(i64),

    /// Device generation other than DAEnetIP2.
    #[error("unsupported DAEnetIP version: {0} (only 2 is supported)")]
    UnsupportedVersion(u8),

    /// Relay bank state with the wrong length or non-binary elements.
    #[error("invalid relay bank state: {0}")]
    State(String),

    /// Invalid OID text.
    #[error("invalid OID '{input}': {kind}")]
    Oid { kind: OidErrorKind, input: String },
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("device protocol error: {0}")]
    DeviceProtocol(#[from] DeviceProtocolError),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        TransportError::Decode { offset, kind }.into()
    }

    /// Create an I/O error.
    pub fn io(target: Option<SocketAddr>, source: std::io::Error) -> Self {
        TransportError::Io { target, source }.into()
    }

    /// Create a timeout error.
    pub fn timeout(target: SocketAddr, elapsed: Duration, request_id: i32) -> Self {
        TransportError::Timeout {
            target,
            elapsed,
            request_id,
        }
        .into()
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid(kind: OidErrorKind, input: impl Into<String>) -> Self {
        InvalidArgument::Oid {
            kind,
            input: input.into(),
        }
        .into()
    }

    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::DeviceProtocol(_) => ErrorKind::DeviceProtocol,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Transport(TransportError::Io { target, .. }) => *target,
            Self::Transport(TransportError::Timeout { target, .. }) => Some(*target),
            Self::DeviceProtocol(DeviceProtocolError::Status { target, .. }) => Some(*target),
            _ => None,
        }
    }
}
