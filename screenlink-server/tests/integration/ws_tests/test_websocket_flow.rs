use screenlink_core::{
    ClientMessage, ConnectionId, ErrorCode, JoinRole, JoinSessionPayload, RegisterHostPayload,
    ServerMessage, SignalPayload,
};

use crate::integration::init_tracing;
use crate::utils::{WsTestClient, start_test_server};

#[tokio::test]
async fn test_register_join_relay_and_host_leave_over_websocket() {
    init_tracing();

    let addr = start_test_server().await;
    let mut host = WsTestClient::connect(addr).await;
    let mut viewer = WsTestClient::connect(addr).await;

    host.send(&ClientMessage::RegisterHost(RegisterHostPayload::default()))
        .await;
    let ServerMessage::RegisterHostResponse(registered) = host.recv().await else {
        panic!("host was not registered");
    };

    viewer
        .send(&ClientMessage::JoinSession(JoinSessionPayload {
            session_code: registered.session_code.clone(),
            role: JoinRole::Viewer,
            pin: None,
        }))
        .await;
    let ServerMessage::JoinSessionResponse(joined) = viewer.recv().await else {
        panic!("viewer did not join");
    };
    assert_eq!(joined.host_id, registered.host_id);

    let ServerMessage::PeerJoined(notice) = host.recv().await else {
        panic!("host was not told about the viewer");
    };
    assert_eq!(notice.peer_id, joined.peer_id);

    let mut forged = SignalPayload::offer(registered.host_id, "v=0");
    forged.sender_id = Some(ConnectionId::new());
    viewer.send(&ClientMessage::Offer(forged)).await;

    let ServerMessage::Offer(offer) = host.recv().await else {
        panic!("offer was not relayed");
    };
    assert_eq!(offer.sender_id, Some(joined.peer_id));

    host.close().await;
    assert_eq!(
        viewer.recv().await,
        ServerMessage::peer_left(registered.host_id)
    );
}

#[tokio::test]
async fn test_garbage_frame_gets_error_and_socket_survives() {
    init_tracing();

    let addr = start_test_server().await;
    let mut client = WsTestClient::connect(addr).await;

    client.send_raw("{ this is not json").await;
    let ServerMessage::Error(err) = client.recv().await else {
        panic!("expected an error frame");
    };
    assert_eq!(err.code, ErrorCode::InvalidMessage);

    client
        .send_raw(r#"{"type":"teleport","data":{}}"#)
        .await;
    let ServerMessage::Error(err) = client.recv().await else {
        panic!("expected an error frame");
    };
    assert_eq!(err.code, ErrorCode::InvalidMessage);

    client
        .send(&ClientMessage::RegisterHost(RegisterHostPayload::default()))
        .await;
    assert!(matches!(
        client.recv().await,
        ServerMessage::RegisterHostResponse(_)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_closes_sockets() {
    init_tracing();

    let addr = start_test_server().await;
    let mut host = WsTestClient::connect(addr).await;

    host.send(&ClientMessage::RegisterHost(RegisterHostPayload {
        expires_in_ms: Some(200),
        ..Default::default()
    }))
    .await;
    assert!(matches!(
        host.recv().await,
        ServerMessage::RegisterHostResponse(_)
    ));

    assert_eq!(host.recv().await, ServerMessage::SessionExpired);
    host.wait_closed().await;
}
