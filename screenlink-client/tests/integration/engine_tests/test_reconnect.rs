use std::time::Duration;

use screenlink_client::{ConnectionState, LinkOptions, TransportEvent, TransportState};
use screenlink_core::ConnectionId;

use crate::integration::init_tracing;
use crate::utils::{SentSignal, TestEngine};

#[tokio::test(start_paused = true)]
async fn test_reconnect_escalates_to_failed() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    let remote = ConnectionId::new();
    engine.handle.initiate(remote).unwrap();
    engine.next_signal().await;
    let transport = engine.transport();

    transport.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;

    transport.emit(TransportEvent::StateChanged(TransportState::Disconnected));
    engine.wait_for(ConnectionState::Reconnecting).await;

    engine
        .wait_for_within(ConnectionState::Failed, Duration::from_secs(30))
        .await;

    assert_eq!(
        engine.handle.status().reason.as_deref(),
        Some("Connection lost")
    );
    // Two attempts allowed, each renegotiating with an ICE restart.
    assert_eq!(transport.ice_restarts(), 2);
    assert!(transport.is_closed());

    let offers = engine
        .signals
        .sent()
        .await
        .into_iter()
        .filter(|s| matches!(s, SentSignal::Offer { target, .. } if *target == remote))
        .count();
    assert_eq!(offers, 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_transport_is_terminal() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    let transport = engine.transport();

    transport.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;

    transport.emit(TransportEvent::StateChanged(TransportState::Failed));
    engine.wait_for(ConnectionState::Failed).await;
    assert_eq!(
        engine.handle.status().reason.as_deref(),
        Some("Connection lost")
    );
    assert!(transport.is_closed());

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(engine.handle.state(), ConnectionState::Failed);
    assert_eq!(transport.ice_restarts(), 0);
    assert_eq!(engine.factory.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_recovery_stops_reconnect_cycle() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    let transport = engine.transport();

    transport.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;

    transport.emit(TransportEvent::StateChanged(TransportState::Disconnected));
    engine.wait_for(ConnectionState::Reconnecting).await;
    transport.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(engine.handle.state(), ConnectionState::Connected);
    assert_eq!(transport.ice_restarts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_answering_side_waits_for_restart_offer() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    let host = ConnectionId::new();
    engine.handle.handle_offer(host, "host-offer".to_owned()).unwrap();
    engine.next_signal().await;
    let transport = engine.transport();

    transport.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;
    transport.emit(TransportEvent::StateChanged(TransportState::Disconnected));
    engine.wait_for(ConnectionState::Reconnecting).await;

    // The host restarts ICE; answering it keeps the link in recovery until connected.
    engine
        .handle
        .handle_offer(host, "restart-offer".to_owned())
        .unwrap();
    assert_eq!(
        engine.next_signal().await,
        SentSignal::Answer {
            target: host,
            sdp: "answer".to_owned()
        }
    );
    assert_eq!(engine.handle.state(), ConnectionState::Reconnecting);
    assert_eq!(transport.ice_restarts(), 0);

    transport.emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;
}

#[tokio::test(start_paused = true)]
async fn test_handshake_timeout() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    engine.wait_for(ConnectionState::Waiting).await;

    engine
        .wait_for_within(ConnectionState::Failed, Duration::from_secs(30))
        .await;

    assert_eq!(
        engine.handle.status().reason.as_deref(),
        Some("Connection timed out")
    );
    assert!(engine.transport().is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_connected_link_has_no_handshake_timeout() {
    init_tracing();

    let mut engine = TestEngine::start(LinkOptions::default());
    engine.handle.initiate(ConnectionId::new()).unwrap();
    engine.next_signal().await;
    engine
        .transport()
        .emit(TransportEvent::StateChanged(TransportState::Connected));
    engine.wait_for(ConnectionState::Connected).await;

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(engine.handle.state(), ConnectionState::Connected);
}
