//! Transport layer abstraction.
//!
//! Provides the `Transport` trait, the UDP implementation used against real
//! devices, and a scripted mock for tests.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Maximum UDP datagram accepted from a device.
pub(crate) const MAX_DATAGRAM: usize = 65535;

/// Client-side transport abstraction.
///
/// Implementations use `Arc` internally, so `Clone` is a reference count
/// increment and clones share one socket.
pub trait Transport: Send + Sync + Clone + 'static {
    /// Send request data to the target.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive one datagram, waiting at most `timeout`.
    ///
    /// `request_id` is only used to label the timeout error; correlation is
    /// checked by the client after decoding.
    ///
    /// Returns (response_data, actual_source_address)
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The peer address for this transport.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;
}
