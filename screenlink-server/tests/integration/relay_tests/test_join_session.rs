use screenlink_core::{
    ConnectionId, JoinRole, JoinSessionResponse, PeerJoinedPayload, PeerRole, RegisterHostPayload,
    ServerMessage,
};

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_admin_join_notifies_host() {
    init_tracing();

    let mut relay = TestRelay::start();
    let host = ConnectionId::new();
    let admin = ConnectionId::new();
    let code = relay.register_host(host, RegisterHostPayload::default()).await;

    let reply = relay.join(admin, &code, JoinRole::Admin, None).await;
    assert_eq!(
        reply,
        ServerMessage::JoinSessionResponse(JoinSessionResponse {
            host_id: host,
            peer_id: admin,
            viewers: vec![],
        })
    );

    let notice = relay.expect_message(host).await;
    assert_eq!(
        notice,
        ServerMessage::PeerJoined(PeerJoinedPayload {
            peer_id: admin,
            role: PeerRole::Admin,
        })
    );
}

#[tokio::test]
async fn test_viewers_accumulate_in_join_order() {
    init_tracing();

    let mut relay = TestRelay::start();
    let host = ConnectionId::new();
    let first = ConnectionId::new();
    let second = ConnectionId::new();
    let code = relay.register_host(host, RegisterHostPayload::default()).await;

    relay.join(first, &code, JoinRole::Viewer, None).await;
    relay.expect_message(host).await;

    let reply = relay.join(second, &code, JoinRole::Viewer, None).await;
    let ServerMessage::JoinSessionResponse(resp) = reply else {
        panic!("expected join-session-response, got {:?}", reply);
    };
    assert_eq!(resp.viewers, vec![first, second]);

    let ServerMessage::PeerJoined(joined) = relay.expect_message(host).await else {
        panic!("host was not notified");
    };
    assert_eq!(joined.peer_id, second);
    assert_eq!(joined.role, PeerRole::Viewer);
}

#[tokio::test]
async fn test_join_with_lowercase_code() {
    init_tracing();

    let mut relay = TestRelay::start();
    let host = ConnectionId::new();
    let code = relay.register_host(host, RegisterHostPayload::default()).await;

    let reply = relay
        .join(ConnectionId::new(), &code.to_lowercase(), JoinRole::Viewer, None)
        .await;
    assert!(matches!(reply, ServerMessage::JoinSessionResponse(_)));
}

#[tokio::test]
async fn test_pin_protected_session_accepts_correct_pin() {
    init_tracing();

    let mut relay = TestRelay::start();
    let host = ConnectionId::new();
    let code = relay
        .register_host(
            host,
            RegisterHostPayload {
                pin: Some("4821".into()),
                ..Default::default()
            },
        )
        .await;

    let reply = relay
        .join(ConnectionId::new(), &code, JoinRole::Admin, Some("4821"))
        .await;
    assert!(matches!(reply, ServerMessage::JoinSessionResponse(_)));
    assert!(matches!(
        relay.expect_message(host).await,
        ServerMessage::PeerJoined(_)
    ));
}
