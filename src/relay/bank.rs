//! The P5 relay bank controller.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, MutexGuard, broadcast};
use tracing::instrument;

use super::device::DeviceIdentity;
use super::event::{ErrorEvent, Event, EventBus, Operation};
use super::mib;
use super::register::{self, Pin, RelayBankState, pin_value};
use crate::client::Client;
use crate::error::{DeviceProtocolError, Result};
use crate::oid::Oid;
use crate::transport::{Transport, UdpTransport};
use crate::value::Value;
use crate::varbind::VarBind;

/// Controller for the eight relays on a DAEnetIP2's P5 port.
///
/// Operations on one controller are serialized: a toggle's read and write
/// cannot interleave with another write, and cache updates from device echoes
/// apply in request order. Clones share the session, cache and subscribers.
///
/// ```rust,no_run
/// # async fn example() -> daenet::Result<()> {
/// use daenet::RelayBank;
///
/// let bank = RelayBank::builder(2)?
///     .host("192.168.1.201")
///     .community(b"private")
///     .connect()
///     .await?;
///
/// bank.initialize().await?;
/// println!("{bank}");
///
/// bank.toggle_relay(3).await?;
/// # Ok(())
/// # }
/// ```
pub struct RelayBank<T: Transport = UdpTransport> {
    inner: Arc<RelayBankInner<T>>,
}

struct RelayBankInner<T: Transport> {
    identity: DeviceIdentity,
    client: Client<T>,
    events: EventBus,
    /// Serializes device operations.
    op_lock: Mutex<()>,
    /// Last device-confirmed state.
    state: RwLock<Option<RelayBankState>>,
}

impl<T: Transport> Clone for RelayBank<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> RelayBank<T> {
    /// Wrap an SNMPv1 client. No request is sent.
    pub fn new(identity: DeviceIdentity, client: Client<T>) -> Self {
        Self {
            inner: Arc::new(RelayBankInner {
                identity,
                client,
                events: EventBus::new(),
                op_lock: Mutex::new(()),
                state: RwLock::new(None),
            }),
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.inner.identity
    }

    pub fn version(&self) -> u8 {
        self.inner.identity.version()
    }

    pub fn host(&self) -> &str {
        self.inner.identity.host()
    }

    pub fn alias(&self) -> &str {
        self.inner.identity.alias()
    }

    /// Resolved device address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.client.peer_addr()
    }

    /// Last device-confirmed state, `None` until the first successful full
    /// read or write.
    pub fn state(&self) -> Option<RelayBankState> {
        *self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    /// First read of the device. Equivalent to [`get_state`](Self::get_state).
    pub async fn initialize(&self) -> Result<RelayBankState> {
        self.get_state().await
    }

    /// Read the whole register.
    pub async fn get_state(&self) -> Result<RelayBankState> {
        let _guard = self.lock().await;
        self.get_state_locked(Operation::GetState).await
    }

    /// Write the whole register. The cache and the returned state come from
    /// the device's echo, not from `new_state`.
    pub async fn set_state(&self, new_state: RelayBankState) -> Result<RelayBankState> {
        let _guard = self.lock().await;
        let result = self.set_state_locked(new_state).await;
        self.report(Operation::SetState, result)
    }

    /// Write one pin.
    ///
    /// `pin` must be 1..=8 and `value` 0 or 1; anything else fails with
    /// `InvalidArgument` before a request is sent. Returns the cached bank
    /// after the update (`None` if the bank was never read).
    pub async fn set_pin(&self, pin: i64, value: i64) -> Result<Option<RelayBankState>> {
        let pin = Pin::new(pin)?;
        let on = pin_value(value)?;

        let _guard = self.lock().await;
        let result = self.set_pin_locked(pin, on).await;
        self.report(Operation::SetPin, result)
    }

    /// Flip one relay based on a fresh read of the device.
    ///
    /// If the read fails the write is never attempted.
    pub async fn toggle_relay(&self, pin: i64) -> Result<Option<RelayBankState>> {
        let pin = Pin::new(pin)?;

        let _guard = self.lock().await;
        let current = self.get_state_locked(Operation::ToggleRelay).await?;
        let target = !current.get(pin);

        tracing::debug!(target: "daenet::relay", { %pin, from = current.get(pin), to = target }, "toggling relay");

        let result = self.set_pin_locked(pin, target).await;
        self.report(Operation::ToggleRelay, result)
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner.op_lock.lock().await
    }

    async fn get_state_locked(&self, operation: Operation) -> Result<RelayBankState> {
        let result = self.read_register().await;
        let state = self.report(operation, result)?;

        self.store(state);
        tracing::debug!(target: "daenet::relay", { device = %self.inner.identity, %state }, "state read");
        self.inner.events.publish(Event::StateRead(state));
        Ok(state)
    }

    #[instrument(level = "debug", skip(self), fields(device = %self.inner.identity))]
    async fn read_register(&self) -> Result<RelayBankState> {
        let oid = mib::register_oid();
        let vb = self.inner.client.get(&oid).await?;
        Ok(register::decode(expect_integer(vb)?))
    }

    #[instrument(level = "debug", skip(self), fields(device = %self.inner.identity))]
    async fn set_state_locked(&self, new_state: RelayBankState) -> Result<RelayBankState> {
        let request = VarBind::new(
            mib::register_oid(),
            Value::Integer(register::encode(&new_state)),
        );
        let echo = self.inner.client.set(request).await?;
        let state = register::decode(expect_integer(echo)?);

        if state != new_state {
            tracing::warn!(target: "daenet::relay", { requested = %new_state, echoed = %state }, "device echoed a different state");
        }

        self.store(state);
        tracing::debug!(target: "daenet::relay", { %state }, "state set");
        self.inner.events.publish(Event::StateSet(state));
        Ok(state)
    }

    #[instrument(level = "debug", skip(self), fields(device = %self.inner.identity))]
    async fn set_pin_locked(&self, pin: Pin, on: bool) -> Result<Option<RelayBankState>> {
        let oid = mib::pin_oid(pin);
        let request = VarBind::new(oid.clone(), Value::Integer(i32::from(on)));
        let echo = self.inner.client.set(request).await?;

        let value = match expect_integer(echo)? {
            0 => false,
            1 => true,
            other => {
                return Err(DeviceProtocolError::PinValueOutOfRange { oid, value: other }.into());
            }
        };

        let cached = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(state) = state.as_mut() {
                state.set(pin, value);
            }
            *state
        };

        tracing::debug!(target: "daenet::relay", { %pin, value }, "pin set");
        self.inner.events.publish(Event::PinSet { pin, value });
        Ok(cached)
    }

    fn store(&self, state: RelayBankState) {
        *self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(state);
    }

    /// Publish an `Error` event for a failed device operation.
    fn report<V>(&self, operation: Operation, result: Result<V>) -> Result<V> {
        if let Err(e) = &result {
            tracing::warn!(target: "daenet::relay", { device = %self.inner.identity, %operation, error = %e }, "operation failed");
            self.inner
                .events
                .publish(Event::Error(ErrorEvent::new(operation, e)));
        }
        result
    }
}

/// Unwrap the INTEGER every relay object carries.
fn expect_integer(vb: VarBind) -> Result<i32> {
    match vb.value {
        Value::Integer(v) => Ok(v),
        other => Err(unexpected_type(vb.oid, &other)),
    }
}

fn unexpected_type(oid: Oid, value: &Value) -> crate::error::Error {
    DeviceProtocolError::UnexpectedType {
        oid,
        actual: value.type_name(),
    }
    .into()
}

/// `DAEnetIP2@192.168.1.201(garage) = [1,0,1,0,0,0,0,0]`, or `= unknown`
/// before the first read.
impl<T: Transport> fmt::Display for RelayBank<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state() {
            Some(state) => write!(f, "{} = {}", self.inner.identity, state),
            None => write!(f, "{} = unknown", self.inner.identity),
        }
    }
}

impl<T: Transport> fmt::Debug for RelayBank<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayBank")
            .field("identity", &self.inner.identity)
            .field("peer", &self.peer_addr())
            .field("state", &self.state())
            .finish()
    }
}

/// Serializable view of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Snapshot {
    pub version: u8,
    pub host: String,
    pub alias: String,
    /// Relay values, pin 1 first; `None` before the first read.
    pub status: Option<[u8; 8]>,
}

impl<T: Transport> RelayBank<T> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version(),
            host: self.host().to_string(),
            alias: self.alias().to_string(),
            status: self.state().map(|s| s.as_bits()),
        }
    }
}
