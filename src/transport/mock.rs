//! Mock transport for testing.
//!
//! Replays scripted responses and records every request, so client and relay
//! behaviour can be checked without a device on the network.

use super::Transport;
use crate::error::{Error, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::value::Value;
use crate::varbind::VarBind;
use bytes::Bytes;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A scripted reply to the next request.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this data as the response (request_id will be patched to match)
    Data(Bytes),
    /// Return this data as-is without patching request_id
    RawData(Bytes),
    /// Simulate a timeout
    Timeout,
    /// Simulate an IO error
    IoError(String),
}

/// A request sent through the mock transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// The raw request data
    pub data: Bytes,
    /// The decoded message, if the bytes were a valid SNMPv1 message
    pub message: Option<CommunityMessage>,
}

impl RecordedRequest {
    /// The request PDU, if the bytes decoded.
    pub fn pdu(&self) -> Option<&Pdu> {
        self.message.as_ref().map(|m| &m.pdu)
    }

    /// Request ID of the recorded message.
    pub fn request_id(&self) -> Option<i32> {
        self.pdu().map(|pdu| pdu.request_id)
    }
}

struct MockTransportInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    /// Last request_id seen (for patching responses)
    last_request_id: Option<i32>,
}

/// Mock transport for testing.
///
/// Requires the `testing` feature outside this crate's own tests.
///
/// ```rust,ignore
/// use daenet::transport::{MockTransport, ResponseBuilder};
/// use daenet::{Value, oid};
///
/// let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
/// mock.queue_response(
///     ResponseBuilder::new(1)
///         .varbind(oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 2, 33, 0), Value::Integer(5))
///         .build(b"public"),
/// );
/// mock.queue_timeout();
/// ```
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
                last_request_id: None,
            })),
        }
    }

    /// Queue a data response.
    ///
    /// The request_id in the response is patched to match the request it
    /// answers. Use [`queue_raw_response`](Self::queue_raw_response) to
    /// bypass patching.
    pub fn queue_response(&mut self, data: impl Into<Bytes>) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(MockResponse::Data(data.into()));
    }

    /// Queue a raw data response without request_id patching.
    pub fn queue_raw_response(&mut self, data: impl Into<Bytes>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .push_back(MockResponse::RawData(data.into()));
    }

    /// Queue a timeout.
    pub fn queue_timeout(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(MockResponse::Timeout);
    }

    /// Queue an IO error.
    pub fn queue_io_error(&mut self, msg: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(MockResponse::IoError(msg.into()));
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.clear();
    }

    /// Get the number of queued responses remaining.
    pub fn queued_response_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.responses.len()
    }

    /// Patch the request_id in a response to match the actual request.
    fn patch_response_request_id(data: Bytes, new_id: i32) -> Bytes {
        let Ok(mut msg) = CommunityMessage::decode(data.clone()) else {
            return data;
        };
        msg.pdu.request_id = new_id;
        msg.encode()
    }
}

impl Transport for MockTransport {
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let data = Bytes::copy_from_slice(data);
        let message = CommunityMessage::decode(data.clone()).ok();
        let request_id = message.as_ref().map(|m| m.pdu.request_id);

        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(RecordedRequest { data, message });
        inner.last_request_id = request_id;

        async { Ok(()) }
    }

    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send {
        let (response, target, last_req_id) = {
            let mut guard = self.inner.lock().unwrap();
            (
                guard.responses.pop_front(),
                guard.target,
                guard.last_request_id,
            )
        };

        async move {
            match response {
                Some(MockResponse::Data(data)) => {
                    let patched = match last_req_id {
                        Some(req_id) => Self::patch_response_request_id(data, req_id),
                        None => data,
                    };
                    Ok((patched, target))
                }
                Some(MockResponse::RawData(data)) => Ok((data, target)),
                Some(MockResponse::IoError(msg)) => {
                    Err(Error::io(Some(target), std::io::Error::other(msg)))
                }
                Some(MockResponse::Timeout) | None => {
                    tokio::time::sleep(timeout).await;
                    Err(Error::timeout(target, timeout, request_id))
                }
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        let inner = self.inner.lock().unwrap();
        inner.target
    }

    fn local_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }
}

/// Builder for SNMPv1 response messages.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    /// Create a new response builder with the given request ID.
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: 0,
            error_index: 0,
        }
    }

    /// Add a varbind to the response.
    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    /// Set the error status.
    pub fn error_status(mut self, status: i32) -> Self {
        self.error_status = status;
        self
    }

    /// Set the error index.
    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    /// Build the encoded SNMPv1 response message.
    pub fn build(self, community: &[u8]) -> Bytes {
        let mut pdu = Pdu::response(self.request_id, self.varbinds);
        pdu.error_status = self.error_status;
        pdu.error_index = self.error_index;
        CommunityMessage::new(Bytes::copy_from_slice(community), pdu).encode()
    }
}
