//! SNMPv1 client.
//!
//! One request at a time, one varbind per request: exactly what the relay
//! bank needs. No retries; a lost datagram surfaces as a timeout.

mod builder;

pub use builder::V1ClientBuilder;

use crate::error::{DecodeErrorKind, DeviceProtocolError, Error, Result, TransportError};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::transport::{Transport, UdpTransport};
use crate::varbind::VarBind;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Span, instrument};

/// SNMPv1 client.
///
/// Generic over transport type, with `UdpTransport` as default. Cloning is
/// cheap and clones share the transport and request ID counter.
#[derive(Clone)]
pub struct Client<T: Transport = UdpTransport> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T: Transport> {
    transport: T,
    config: ClientConfig,
    next_request_id: AtomicI32,
}

/// Client configuration.
///
/// Most users should use [`Client::v1`] rather than constructing this directly.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Community string (default: "public")
    pub community: Bytes,
    /// Request timeout (default: 5 seconds)
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Client<UdpTransport> {
    /// Start building an SNMPv1 client for `target` (`host:port`).
    ///
    /// ```rust,no_run
    /// # use daenet::Client;
    /// # use std::time::Duration;
    /// # async fn example() -> daenet::Result<()> {
    /// let client = Client::v1("192.168.1.201:161")
    ///     .community(b"private")
    ///     .timeout(Duration::from_secs(2))
    ///     .connect()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn v1(target: impl Into<String>) -> V1ClientBuilder {
        V1ClientBuilder::new(target)
    }
}

impl<T: Transport> Client<T> {
    /// Create a new client with the given transport and config.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                config,
                next_request_id: AtomicI32::new(1),
            }),
        }
    }

    /// Get the peer (target) address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.transport.peer_addr()
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Generate next request ID, staying within 1..=i32::MAX.
    fn next_request_id(&self) -> i32 {
        let id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        if id <= 0 {
            self.inner.next_request_id.store(2, Ordering::Relaxed);
            return 1;
        }
        id
    }

    /// Send a request and wait for the matching response.
    #[instrument(
        level = "debug",
        skip(self, pdu),
        fields(
            snmp.target = %self.peer_addr(),
            snmp.pdu_type = %pdu.pdu_type,
            snmp.request_id = pdu.request_id,
            snmp.elapsed_ms = tracing::field::Empty,
        )
    )]
    async fn send_request(&self, pdu: Pdu) -> Result<Pdu> {
        let start = Instant::now();
        let request_id = pdu.request_id;
        let message = CommunityMessage::new(self.inner.config.community.clone(), pdu);
        let data = message.encode();

        tracing::trace!(target: "daenet::client", { snmp.bytes = data.len() }, "sending request");
        self.inner.transport.send(&data).await?;

        let result = self.recv_response(request_id).await;
        Span::current().record("snmp.elapsed_ms", start.elapsed().as_millis() as u64);
        result
    }

    /// Wait for the response to `request_id` until the request timeout runs
    /// out.
    ///
    /// Late replies to earlier requests and datagrams that are not a v1
    /// Response are discarded; they never fail the current request.
    async fn recv_response(&self, request_id: i32) -> Result<Pdu> {
        let request_timeout = self.inner.config.timeout;
        let deadline = Instant::now() + request_timeout;

        let response = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::timeout(self.peer_addr(), request_timeout, request_id));
            }

            let response_data = match self.inner.transport.recv(request_id, remaining).await {
                Ok((data, _source)) => data,
                Err(Error::Transport(TransportError::Timeout { .. })) => {
                    return Err(Error::timeout(self.peer_addr(), request_timeout, request_id));
                }
                Err(e) => return Err(e),
            };

            tracing::trace!(target: "daenet::client", { snmp.bytes = response_data.len() }, "received response");

            let response = match CommunityMessage::decode(response_data) {
                Ok(message) => message.into_pdu(),
                Err(e) => {
                    tracing::debug!(target: "daenet::client", { peer = %self.peer_addr(), error = %e }, "discarding undecodable datagram");
                    continue;
                }
            };

            if response.pdu_type != PduType::Response {
                tracing::debug!(target: "daenet::client", { peer = %self.peer_addr(), pdu_type = %response.pdu_type }, "discarding non-Response PDU");
                continue;
            }

            if response.request_id != request_id {
                tracing::debug!(target: "daenet::client", { expected_request_id = request_id, actual_request_id = response.request_id, peer = %self.peer_addr() }, "discarding response for unknown request_id");
                continue;
            }

            break response;
        };

        if response.is_error() {
            let status = response.error_status_enum();
            let oid = response.error_oid().cloned();
            tracing::warn!(target: "daenet::client", { peer = %self.peer_addr(), %status, snmp.error_index = response.error_index }, "device returned error status");
            return Err(DeviceProtocolError::Status {
                target: self.peer_addr(),
                status,
                index: response.error_index.max(0) as u32,
                oid,
            }
            .into());
        }

        tracing::debug!(target: "daenet::client", { snmp.varbind_count = response.varbinds.len() }, "received {} response", response.pdu_type);

        Ok(response)
    }

    /// Extract the single varbind for `oid` from a response.
    fn single_varbind(response: Pdu, oid: &Oid) -> Result<VarBind> {
        let vb = response
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| Error::decode(0, DecodeErrorKind::EmptyResponse))?;

        if vb.oid != *oid {
            return Err(DeviceProtocolError::OidMismatch {
                expected: oid.clone(),
                actual: vb.oid,
            }
            .into());
        }

        if vb.value.is_exception() {
            return Err(DeviceProtocolError::Exception {
                oid: vb.oid,
                exception: vb.value.type_name(),
            }
            .into());
        }

        Ok(vb)
    }

    /// GET a single object.
    pub async fn get(&self, oid: &Oid) -> Result<VarBind> {
        oid.validate()?;
        let request_id = self.next_request_id();
        let pdu = Pdu::get_request(request_id, std::slice::from_ref(oid));
        let response = self.send_request(pdu).await?;
        Self::single_varbind(response, oid)
    }

    /// SET a single object, returning the value the device echoed back.
    pub async fn set(&self, varbind: VarBind) -> Result<VarBind> {
        varbind.oid.validate()?;
        let request_id = self.next_request_id();
        let oid = varbind.oid.clone();
        let pdu = Pdu::set_request(request_id, vec![varbind]);
        let response = self.send_request(pdu).await?;
        Self::single_varbind(response, &oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use crate::oid;
    use crate::transport::{MockTransport, ResponseBuilder};
    use crate::value::Value;

    fn register() -> Oid {
        oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 2, 33, 0)
    }

    fn mock_client(mock: &MockTransport) -> Client<MockTransport> {
        Client::v1("127.0.0.1:161")
            .community(b"private")
            .build(mock.clone())
    }

    #[tokio::test]
    async fn test_get_sends_v1_get_request() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(register(), Value::Integer(170))
                .build(b"private"),
        );
        let client = mock_client(&mock);

        let vb = client.get(&register()).await.unwrap();
        assert_eq!(vb.value, Value::Integer(170));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let message = requests[0].message.as_ref().unwrap();
        assert_eq!(message.community.as_ref(), b"private");
        assert_eq!(message.pdu.pdu_type, PduType::GetRequest);
        assert_eq!(message.pdu.varbinds, vec![VarBind::null(register())]);
    }

    #[tokio::test]
    async fn test_set_returns_echo() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(register(), Value::Integer(3))
                .build(b"public"),
        );
        let client = mock_client(&mock);

        let echo = client
            .set(VarBind::new(register(), Value::Integer(7)))
            .await
            .unwrap();
        assert_eq!(echo.value, Value::Integer(3));

        let pdu = mock.requests()[0].pdu().cloned().unwrap();
        assert_eq!(pdu.pdu_type, PduType::SetRequest);
        assert_eq!(pdu.varbinds[0].value, Value::Integer(7));
    }

    #[tokio::test]
    async fn test_request_ids_increment() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        for _ in 0..2 {
            mock.queue_response(
                ResponseBuilder::new(0)
                    .varbind(register(), Value::Integer(0))
                    .build(b"public"),
            );
        }
        let client = mock_client(&mock);
        client.get(&register()).await.unwrap();
        client.get(&register()).await.unwrap();

        let ids: Vec<_> = mock.requests().iter().map(|r| r.request_id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_device_protocol() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(register(), Value::Integer(1))
                .error_status(ErrorStatus::ReadOnly.as_i32())
                .error_index(1)
                .build(b"public"),
        );
        let client = mock_client(&mock);

        let err = client
            .set(VarBind::new(register(), Value::Integer(1)))
            .await
            .unwrap_err();
        match err {
            Error::DeviceProtocol(DeviceProtocolError::Status {
                status, index, oid, ..
            }) => {
                assert_eq!(status, ErrorStatus::ReadOnly);
                assert_eq!(index, 1);
                assert_eq!(oid, Some(register()));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exception_value_rejected() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(register(), Value::NoSuchObject)
                .build(b"public"),
        );
        let client = mock_client(&mock);

        let err = client.get(&register()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::DeviceProtocol(DeviceProtocolError::Exception {
                exception: "noSuchObject",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_stale_response_is_skipped() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        // Late reply to an earlier request, then the real one.
        mock.queue_raw_response(
            ResponseBuilder::new(999)
                .varbind(register(), Value::Integer(0))
                .build(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(register(), Value::Integer(42))
                .build(b"public"),
        );
        let client = mock_client(&mock);

        let vb = client.get(&register()).await.unwrap();
        assert_eq!(vb.value, Value::Integer(42));
        assert_eq!(mock.queued_response_count(), 0);
    }

    #[tokio::test]
    async fn test_garbage_datagram_is_skipped() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_raw_response(Bytes::from_static(&[0x30, 0x03, 0xFF, 0xFF]));
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(register(), Value::Integer(5))
                .build(b"public"),
        );
        let client = mock_client(&mock);

        let vb = client.get(&register()).await.unwrap();
        assert_eq!(vb.value, Value::Integer(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_stale_responses_times_out() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_raw_response(
            ResponseBuilder::new(999)
                .varbind(register(), Value::Integer(0))
                .build(b"public"),
        );
        let client = Client::v1("127.0.0.1:161")
            .timeout(Duration::from_secs(2))
            .build(mock.clone());

        let start = Instant::now();
        let err = client.get(&register()).await.unwrap_err();
        match err {
            Error::Transport(TransportError::Timeout {
                elapsed, request_id, ..
            }) => {
                assert_eq!(elapsed, Duration::from_secs(2));
                assert_eq!(request_id, 1);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(ResponseBuilder::new(0).build(b"public"));
        let client = mock_client(&mock);

        let err = client.get(&register()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Decode {
                kind: DecodeErrorKind::EmptyResponse,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_oid_mismatch() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(0))
                .build(b"public"),
        );
        let client = mock_client(&mock);

        let err = client.get(&register()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::DeviceProtocol(DeviceProtocolError::OidMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_unencodable_oid_sends_nothing() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let client = mock_client(&mock);

        let err = client
            .get(&Oid::from_slice(&[u32::MAX, 1]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);

        let err = client
            .set(VarBind::new(oid!(7, 1), Value::Integer(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_propagates() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_timeout();
        let client = Client::v1("127.0.0.1:161")
            .timeout(Duration::from_millis(250))
            .build(mock.clone());

        let err = client.get(&register()).await.unwrap_err();
        match err {
            Error::Transport(TransportError::Timeout {
                elapsed, request_id, ..
            }) => {
                assert_eq!(elapsed, Duration::from_millis(250));
                assert_eq!(request_id, 1);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
