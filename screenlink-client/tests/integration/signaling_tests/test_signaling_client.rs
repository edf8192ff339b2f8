use screenlink_client::{ClientError, SignalSink};
use screenlink_core::utils::is_valid_session_code;
use screenlink_core::{
    ErrorCode, IcePayload, JoinRole, PeerJoinedPayload, PeerRole, RegisterHostPayload,
    ServerMessage, Signal,
};

use crate::integration::init_tracing;
use crate::utils::{connect, next_server_message, start_relay};

#[tokio::test]
async fn test_register_and_join() {
    init_tracing();

    let url = start_relay().await;
    let (host, mut host_rx) = connect(&url).await;
    let (viewer, _viewer_rx) = connect(&url).await;

    let registered = host
        .register_host(RegisterHostPayload::default())
        .await
        .unwrap();
    assert!(is_valid_session_code(&registered.session_code));

    let joined = viewer
        .join_session(&registered.session_code.to_lowercase(), JoinRole::Viewer, None)
        .await
        .unwrap();
    assert_eq!(joined.host_id, registered.host_id);

    assert_eq!(
        next_server_message(&mut host_rx).await,
        ServerMessage::PeerJoined(PeerJoinedPayload {
            peer_id: joined.peer_id,
            role: PeerRole::Viewer,
        })
    );
}

#[tokio::test]
async fn test_protocol_errors_are_returned() {
    init_tracing();

    let url = start_relay().await;
    let (host, _host_rx) = connect(&url).await;
    let (peer, _peer_rx) = connect(&url).await;

    let registered = host
        .register_host(RegisterHostPayload {
            pin: Some("4821".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();
    let code = registered.session_code.as_str();

    let cases = [
        ("nope", None, ErrorCode::InvalidCode),
        ("ABC-DEF-GHJ", None, ErrorCode::SessionNotFound),
        (code, None, ErrorCode::PinRequired),
        (code, Some("0000"), ErrorCode::InvalidPin),
    ];
    for (session_code, pin, expected) in cases {
        let result = peer
            .join_session(session_code, JoinRole::Admin, pin.map(str::to_owned))
            .await;
        match result {
            Err(ClientError::Protocol(got)) => assert_eq!(got, expected, "joining {}", session_code),
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    // Errors leave the connection usable.
    peer.join_session(code, JoinRole::Admin, Some("4821".to_owned()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_signals_carry_relay_assigned_sender() {
    init_tracing();

    let url = start_relay().await;
    let (host, mut host_rx) = connect(&url).await;
    let (viewer, mut viewer_rx) = connect(&url).await;

    let registered = host
        .register_host(RegisterHostPayload::default())
        .await
        .unwrap();
    let joined = viewer
        .join_session(&registered.session_code, JoinRole::Admin, None)
        .await
        .unwrap();
    next_server_message(&mut host_rx).await;

    viewer
        .send_answer(registered.host_id, "v=0 answer".to_owned())
        .await;
    let ServerMessage::Answer(answer) = next_server_message(&mut host_rx).await else {
        panic!("expected answer");
    };
    assert_eq!(answer.sender_id, Some(joined.peer_id));
    assert!(matches!(answer.signal, Signal::Sdp(ref sdp) if sdp.sdp == "v=0 answer"));

    host.send_ice_candidate(joined.peer_id, IcePayload::new("candidate:1"))
        .await;
    let ServerMessage::IceCandidate(ice) = next_server_message(&mut viewer_rx).await else {
        panic!("expected ice candidate");
    };
    assert_eq!(ice.sender_id, Some(registered.host_id));
}

#[tokio::test]
async fn test_close_reports_peer_left() {
    init_tracing();

    let url = start_relay().await;
    let (host, mut host_rx) = connect(&url).await;
    let (viewer, _viewer_rx) = connect(&url).await;

    let registered = host
        .register_host(RegisterHostPayload::default())
        .await
        .unwrap();
    let joined = viewer
        .join_session(&registered.session_code, JoinRole::Viewer, None)
        .await
        .unwrap();
    next_server_message(&mut host_rx).await;

    viewer.close();

    assert_eq!(
        next_server_message(&mut host_rx).await,
        ServerMessage::peer_left(joined.peer_id)
    );
}
