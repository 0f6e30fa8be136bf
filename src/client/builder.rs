//! Builder for SNMPv1 clients.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::transport::{Transport, UdpTransport};

use super::{Client, ClientConfig};

/// Resolve `host:port` to the first socket address.
pub(crate) async fn resolve_target(target: &str) -> Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host(target)
        .await
        .map_err(|e| TransportError::Resolve {
            target: target.to_string(),
            source: Some(e),
        })?;

    addrs.next().ok_or_else(|| {
        TransportError::Resolve {
            target: target.to_string(),
            source: None,
        }
        .into()
    })
}

/// Builder for SNMPv1 clients.
///
/// Created via [`Client::v1()`].
pub struct V1ClientBuilder {
    target: String,
    config: ClientConfig,
}

impl V1ClientBuilder {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            config: ClientConfig::default(),
        }
    }

    /// Set the community string.
    pub fn community(mut self, community: &[u8]) -> Self {
        self.config.community = Bytes::copy_from_slice(community);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Resolve the target and create the client with an owned UDP transport.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let addr = resolve_target(&self.target).await?;
        let transport = UdpTransport::connect(addr).await?;
        Ok(self.build(transport))
    }

    /// Build client with a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        Client::new(transport, self.config)
    }
}
