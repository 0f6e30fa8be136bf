//! UDP transport implementation.

use super::{MAX_DATAGRAM, Transport};
use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// UDP transport for a single device.
///
/// Owns a connected UDP socket, so datagrams from other sources are dropped
/// by the kernel.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral socket and connect it to `target`.
    ///
    /// No datagram is exchanged; an unreachable device only shows up on the
    /// first request.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        tracing::debug!(target: "daenet::transport", { snmp.target = %target }, "connecting UDP transport");

        let socket = bind_ephemeral_udp_socket(target).map_err(|e| Error::io(Some(target), e))?;

        socket
            .connect(target)
            .await
            .map_err(|e| Error::io(Some(target), e))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| Error::io(Some(target), e))?;

        tracing::debug!(
            target: "daenet::transport",
            { snmp.target = %target, snmp.local_addr = %local_addr },
            "UDP transport connected"
        );

        Ok(Self {
            inner: Arc::new(UdpTransportInner {
                socket,
                target,
                local_addr,
            }),
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "daenet::transport",
            { snmp.target = %self.inner.target, snmp.bytes = data.len() },
            "UDP send"
        );
        self.inner
            .socket
            .send(data)
            .await
            .map_err(|e| Error::io(Some(self.inner.target), e))?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, recv_timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        match timeout(recv_timeout, self.inner.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(
                    target: "daenet::transport",
                    { snmp.target = %self.inner.target, snmp.bytes = len },
                    "UDP recv complete"
                );
                Ok((Bytes::from(buf), self.inner.target))
            }
            Ok(Err(e)) => Err(Error::io(Some(self.inner.target), e)),
            Err(_) => {
                tracing::trace!(
                    target: "daenet::transport",
                    { snmp.target = %self.inner.target, snmp.request_id = request_id },
                    "UDP recv timeout"
                );
                Err(Error::timeout(self.inner.target, recv_timeout, request_id))
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }
}
