//! Builder for [`RelayBank`].

use std::time::Duration;

use bytes::Bytes;

use super::bank::RelayBank;
use super::device::{DeviceConfig, check_version};
use crate::client::{Client, ClientConfig};
use crate::error::Result;
use crate::transport::{Transport, UdpTransport};

/// Builder for a relay bank controller.
///
/// Created via [`RelayBank::builder()`], which rejects unsupported device
/// versions up front.
#[derive(Debug, Clone)]
pub struct RelayBankBuilder {
    config: DeviceConfig,
}

impl RelayBank<UdpTransport> {
    /// Start configuring a controller for a DAEnetIP `version` device.
    ///
    /// Only version 2 is supported; anything else fails with
    /// [`InvalidArgument::UnsupportedVersion`](crate::error::InvalidArgument::UnsupportedVersion).
    pub fn builder(version: u8) -> Result<RelayBankBuilder> {
        RelayBankBuilder::from_config(DeviceConfig {
            version,
            ..Default::default()
        })
    }
}

impl RelayBankBuilder {
    /// Start from a complete configuration.
    pub fn from_config(config: DeviceConfig) -> Result<Self> {
        check_version(config.version)?;
        Ok(Self { config })
    }

    /// Device host name or address (default: `localhost`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// SNMP agent port (default: 161).
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Human-readable name (default: `DAEnetIP<version>`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.config.alias = Some(alias.into());
        self
    }

    /// Read/write community (default: `public`).
    pub fn community(mut self, community: &[u8]) -> Self {
        self.config.community = Bytes::copy_from_slice(community);
        self
    }

    /// Per-request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Resolve the host and bind a UDP socket. The device is not contacted.
    pub async fn connect(self) -> Result<RelayBank<UdpTransport>> {
        let client = Client::v1(self.config.target())
            .community(&self.config.community)
            .timeout(self.config.timeout)
            .connect()
            .await?;
        Ok(self.finish(client))
    }

    /// Build with a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> RelayBank<T> {
        let client = Client::new(
            transport,
            ClientConfig {
                community: self.config.community.clone(),
                timeout: self.config.timeout,
            },
        );
        self.finish(client)
    }

    fn finish<T: Transport>(self, client: Client<T>) -> RelayBank<T> {
        let identity = self.config.identity_unchecked();
        tracing::debug!(target: "daenet::relay", { device = %identity, peer = %client.peer_addr() }, "relay bank created");
        RelayBank::new(identity, client)
    }
}
