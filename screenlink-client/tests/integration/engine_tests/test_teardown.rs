use screenlink_client::{
    ClientError, ConnectionState, LinkOptions, TransportEvent, TransportState,
};
use screenlink_core::ConnectionId;

use crate::integration::init_tracing;
use crate::utils::TestEngine;

#[tokio::test]
async fn test_teardown_is_idempotent() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    let transport = engine.transport();

    engine.handle.teardown().await.unwrap();
    engine.handle.teardown().await.unwrap();

    assert_eq!(engine.handle.state(), ConnectionState::Disconnected);
    assert_eq!(transport.close_count(), 1);
}

#[tokio::test]
async fn test_events_from_old_transport_are_ignored() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    let old = engine.transport();

    engine.handle.teardown().await.unwrap();
    old.emit(TransportEvent::StateChanged(TransportState::Connected));

    // No transport left, so this is answered only after the stale event was handled.
    let result = engine.handle.send_data(bytes::Bytes::from_static(b"x")).await;
    assert!(matches!(result, Err(ClientError::Closed)));
    assert_eq!(engine.handle.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_new_negotiation_replaces_transport() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    let first = ConnectionId::new();
    let second = ConnectionId::new();

    engine.handle.initiate(first).unwrap();
    engine.next_signal().await;
    let old = engine.transport();

    engine.handle.initiate(second).unwrap();
    engine.next_signal().await;

    assert_eq!(engine.factory.count(), 2);
    assert!(old.is_closed());

    old.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine
        .transport()
        .emit(TransportEvent::StateChanged(TransportState::Disconnected));
    engine.wait_for(ConnectionState::Reconnecting).await;
}

#[tokio::test]
async fn test_engine_stops_when_handles_drop() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    let transport = engine.transport();

    let handle = engine.handle.clone();
    drop(engine);
    drop(handle);

    crate::utils::eventually("transport close on shutdown", || transport.is_closed()).await;
}
