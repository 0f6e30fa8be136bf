//! Relay bank against an in-process DAEnetIP2 over loopback UDP.

mod common;

use common::{COMMUNITY, FakeDevice, init_tracing, register_oid, unsupported_oid};
use daenet::error::{DeviceProtocolError, ErrorStatus, TransportError};
use daenet::relay::register;
use daenet::{Client, Error, ErrorKind, Event, RelayBank, RelayBankState, Value, VarBind};
use std::time::Duration;

async fn connect(device: &FakeDevice) -> RelayBank {
    init_tracing();
    RelayBank::builder(2)
        .unwrap()
        .host("127.0.0.1")
        .port(device.port())
        .alias("loopback")
        .community(COMMUNITY)
        .timeout(Duration::from_millis(500))
        .connect()
        .await
        .unwrap()
}

#[tokio::test]
async fn initialize_reads_register() {
    let device = FakeDevice::start(5).await;
    let bank = connect(&device).await;
    assert_eq!(device.request_count(), 0);

    let state = bank.initialize().await.unwrap();
    assert_eq!(state.as_bits(), [1, 0, 1, 0, 0, 0, 0, 0]);
    assert_eq!(
        bank.to_string(),
        "DAEnetIP2@127.0.0.1(loopback) = [1,0,1,0,0,0,0,0]"
    );
}

#[tokio::test]
async fn set_state_writes_register() {
    let device = FakeDevice::start(0).await;
    let bank = connect(&device).await;
    let mut events = bank.subscribe();

    let state = bank.set_state(register::decode(170)).await.unwrap();

    assert_eq!(device.register(), 170);
    assert_eq!(register::encode(&state), 170);
    assert_eq!(events.recv().await.unwrap(), Event::StateSet(state));
}

#[tokio::test]
async fn set_pin_changes_one_relay() {
    let device = FakeDevice::start(0b1000_0001).await;
    let bank = connect(&device).await;
    bank.get_state().await.unwrap();

    let state = bank.set_pin(4, 1).await.unwrap().unwrap();
    assert_eq!(device.register(), 0b1000_1001);
    assert_eq!(state.as_bits(), [1, 0, 0, 1, 0, 0, 0, 1]);

    bank.set_pin(8, 0).await.unwrap();
    assert_eq!(device.register(), 0b0000_1001);
}

#[tokio::test]
async fn toggle_follows_device_not_cache() {
    let device = FakeDevice::start(0).await;
    let bank = connect(&device).await;
    bank.get_state().await.unwrap();

    // Someone else switched relay 2 on.
    device.set_register(0b0000_0010);

    let state = bank.toggle_relay(2).await.unwrap().unwrap();
    assert_eq!(device.register(), 0);
    assert_eq!(state, RelayBankState::ALL_OFF);
    assert_eq!(device.request_count(), 3);
}

#[tokio::test]
async fn invalid_arguments_never_reach_device() {
    let device = FakeDevice::start(0).await;
    let bank = connect(&device).await;

    for (pin, value) in [(0, 1), (9, 1), (3, 2)] {
        let err = bank.set_pin(pin, value).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert!(bank.toggle_relay(-1).await.is_err());
    assert_eq!(device.request_count(), 0);
}

#[tokio::test]
async fn silent_device_times_out_and_keeps_cache() {
    let device = FakeDevice::start(5).await;
    let bank = connect(&device).await;
    let before = bank.get_state().await.unwrap();

    device.set_silent(true);
    let mut events = bank.subscribe();

    let err = bank.get_state().await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
    assert_eq!(bank.state(), Some(before));

    let Event::Error(event) = events.recv().await.unwrap() else {
        panic!("expected error event");
    };
    assert_eq!(event.kind, ErrorKind::Transport);
}

#[tokio::test]
async fn toggle_aborts_when_read_times_out() {
    let device = FakeDevice::start(1).await;
    let bank = connect(&device).await;
    device.set_silent(true);

    assert!(bank.toggle_relay(1).await.is_err());
    assert_eq!(device.request_count(), 1);
    assert_eq!(device.register(), 1);
}

#[tokio::test]
async fn wrong_community_is_ignored() {
    let device = FakeDevice::start(5).await;
    let bank = RelayBank::builder(2)
        .unwrap()
        .host("127.0.0.1")
        .port(device.port())
        .community(b"public")
        .timeout(Duration::from_millis(200))
        .connect()
        .await
        .unwrap();

    let err = bank.get_state().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(bank.state(), None);
}

#[tokio::test]
async fn client_reports_no_such_name() {
    let device = FakeDevice::start(0).await;
    let client = Client::v1(device.addr().to_string())
        .community(COMMUNITY)
        .timeout(Duration::from_millis(500))
        .connect()
        .await
        .unwrap();

    let err = client.get(&unsupported_oid()).await.unwrap_err();
    match err {
        Error::DeviceProtocol(DeviceProtocolError::Status { status, oid, .. }) => {
            assert_eq!(status, ErrorStatus::NoSuchName);
            assert_eq!(oid, Some(unsupported_oid()));
        }
        other => panic!("expected noSuchName, got {:?}", other),
    }
}

#[tokio::test]
async fn client_set_register_echo() {
    let device = FakeDevice::start(0).await;
    let client = Client::v1(device.addr().to_string())
        .community(COMMUNITY)
        .connect()
        .await
        .unwrap();

    // Only the low byte survives on the device.
    let echo = client
        .set(VarBind::new(register_oid(), Value::Integer(0x1FF)))
        .await
        .unwrap();
    assert_eq!(echo.value, Value::Integer(0xFF));
    assert_eq!(device.register(), 0xFF);
}

#[tokio::test]
async fn shared_controller_serializes_writes() {
    let device = FakeDevice::start(0).await;
    let bank = connect(&device).await;
    bank.get_state().await.unwrap();

    let handles: Vec<_> = (1..=8)
        .map(|pin| {
            let bank = bank.clone();
            tokio::spawn(async move { bank.set_pin(pin, 1).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(device.register(), 0xFF);
    assert_eq!(bank.state(), Some(RelayBankState::ALL_ON));
}

#[tokio::test]
async fn late_reply_does_not_poison_next_request() {
    let device = FakeDevice::start(5).await;
    init_tracing();
    let bank = RelayBank::builder(2)
        .unwrap()
        .host("127.0.0.1")
        .port(device.port())
        .community(COMMUNITY)
        .timeout(Duration::from_millis(150))
        .connect()
        .await
        .unwrap();

    device.set_delay(Duration::from_millis(300));
    let err = bank.get_state().await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));

    // Let the late reply land in the client's socket buffer.
    device.set_delay(Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(250)).await;

    for _ in 0..4 {
        let state = bank.get_state().await.unwrap();
        assert_eq!(state.as_bits(), [1, 0, 1, 0, 0, 0, 0, 0]);
    }
    assert_eq!(device.request_count(), 5);
}

#[tokio::test]
async fn abandoned_operation_does_not_poison_next_request() {
    let device = FakeDevice::start(0).await;
    let bank = connect(&device).await;

    device.set_delay(Duration::from_millis(100));
    let abandoned = tokio::time::timeout(Duration::from_millis(20), bank.get_state()).await;
    assert!(abandoned.is_err());

    device.set_delay(Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let state = bank.set_state(register::decode(0x0F)).await.unwrap();
    assert_eq!(register::encode(&state), 0x0F);
    assert_eq!(bank.get_state().await.unwrap(), state);
}
