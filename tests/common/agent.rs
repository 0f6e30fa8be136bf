//! In-process DAEnetIP2 agent for testing.
//!
//! Answers SNMPv1 GET/SET for the P5 register and pin objects over loopback
//! UDP. Binds an ephemeral port and stops on drop.

use crate::common::fixtures::{COMMUNITY, pin_oid, register_oid};

use bytes::Bytes;
use daenet::error::ErrorStatus;
use daenet::message::CommunityMessage;
use daenet::pdu::{Pdu, PduType};
use daenet::{Value, VarBind};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

struct DeviceState {
    register: Mutex<u8>,
    /// Drop every request (simulates an unreachable device).
    silent: AtomicBool,
    /// Reply delay in milliseconds (simulates a slow device).
    delay_ms: AtomicU64,
    /// Requests received, including dropped ones.
    requests: AtomicUsize,
}

/// A fake DAEnetIP2 board.
///
/// ```ignore
/// let device = FakeDevice::start(5).await;
/// let bank = RelayBank::builder(2)?.port(device.addr().port()).connect().await?;
/// ```
pub struct FakeDevice {
    addr: SocketAddr,
    state: Arc<DeviceState>,
    task: JoinHandle<()>,
}

impl FakeDevice {
    /// Start a device with the given register value.
    pub async fn start(register: u8) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake device");
        let addr = socket.local_addr().unwrap();

        let state = Arc::new(DeviceState {
            register: Mutex::new(register),
            silent: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            requests: AtomicUsize::new(0),
        });

        let task = tokio::spawn(serve(Arc::new(socket), state.clone()));

        Self { addr, state, task }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Current register value.
    pub fn register(&self) -> u8 {
        *self.state.register.lock().unwrap()
    }

    /// Change the relays behind the controller's back.
    pub fn set_register(&self, value: u8) {
        *self.state.register.lock().unwrap() = value;
    }

    pub fn set_silent(&self, silent: bool) {
        self.state.silent.store(silent, Ordering::SeqCst);
    }

    /// Answer every request only after `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: Arc<UdpSocket>, state: Arc<DeviceState>) {
    let mut buf = vec![0u8; 65535];
    loop {
        let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
            return;
        };
        state.requests.fetch_add(1, Ordering::SeqCst);

        if state.silent.load(Ordering::SeqCst) {
            continue;
        }

        // Undecodable or wrong community: real agents stay silent too.
        let Ok(request) = CommunityMessage::decode(Bytes::copy_from_slice(&buf[..len])) else {
            continue;
        };
        if request.community.as_ref() != COMMUNITY {
            continue;
        }

        let response = handle(&state, &request.pdu);
        let reply = CommunityMessage::new(request.community.clone(), response).encode();

        let delay = state.delay_ms.load(Ordering::SeqCst);
        if delay == 0 {
            let _ = socket.send_to(&reply, peer).await;
        } else {
            let socket = socket.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                let _ = socket.send_to(&reply, peer).await;
            });
        }
    }
}

fn handle(state: &DeviceState, pdu: &Pdu) -> Pdu {
    let mut register = state.register.lock().unwrap();
    let mut varbinds = Vec::with_capacity(pdu.varbinds.len());

    for (i, vb) in pdu.varbinds.iter().enumerate() {
        let error_index = i as i32 + 1;
        let pin = (1..=8).find(|&p| vb.oid == pin_oid(p));

        let value = match (pdu.pdu_type, pin) {
            (PduType::GetRequest, None) if vb.oid == register_oid() => *register as i32,
            (PduType::GetRequest, Some(p)) => ((*register >> (p - 1)) & 1) as i32,
            (PduType::SetRequest, None) if vb.oid == register_oid() => match vb.value {
                Value::Integer(v) => {
                    *register = (v & 0xFF) as u8;
                    *register as i32
                }
                _ => return pdu.to_error_response(ErrorStatus::BadValue, error_index),
            },
            (PduType::SetRequest, Some(p)) => match vb.value {
                Value::Integer(v @ (0 | 1)) => {
                    let mask = 1u8 << (p - 1);
                    if v == 1 {
                        *register |= mask;
                    } else {
                        *register &= !mask;
                    }
                    v
                }
                _ => return pdu.to_error_response(ErrorStatus::BadValue, error_index),
            },
            _ => return pdu.to_error_response(ErrorStatus::NoSuchName, error_index),
        };

        varbinds.push(VarBind::new(vb.oid.clone(), Value::Integer(value)));
    }

    Pdu::response(pdu.request_id, varbinds)
}
