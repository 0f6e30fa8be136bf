//! Device identity and connection settings.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{InvalidArgument, Result};

/// The only DAEnetIP generation with SNMP relay control.
pub const SUPPORTED_VERSION: u8 = 2;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 161;
pub const DEFAULT_COMMUNITY: &[u8] = b"public";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reject every DAEnetIP generation except 2.
pub fn check_version(version: u8) -> Result<u8> {
    if version == SUPPORTED_VERSION {
        Ok(version)
    } else {
        Err(InvalidArgument::UnsupportedVersion(version).into())
    }
}

/// Who the controller talks to. Fixed for the controller's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    version: u8,
    host: String,
    alias: String,
}

impl DeviceIdentity {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

/// `DAEnetIP2@192.168.1.201(garage)`
impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DAEnetIP{}@{}({})", self.version, self.host, self.alias)
    }
}

/// Connection settings for one device.
///
/// `alias` of `None` means `DAEnetIP<version>`.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub version: u8,
    pub host: String,
    pub port: u16,
    pub alias: Option<String>,
    pub community: Bytes,
    pub timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            alias: None,
            community: Bytes::from_static(DEFAULT_COMMUNITY),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DeviceConfig {
    /// Validate and freeze the identity part of the configuration.
    pub fn identity(&self) -> Result<DeviceIdentity> {
        check_version(self.version)?;
        Ok(self.identity_unchecked())
    }

    /// Identity of a configuration whose version was already checked.
    pub(crate) fn identity_unchecked(&self) -> DeviceIdentity {
        DeviceIdentity {
            version: self.version,
            host: self.host.clone(),
            alias: self
                .alias
                .clone()
                .unwrap_or_else(|| format!("DAEnetIP{}", self.version)),
        }
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn target(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
