use crate::relay::RelayCommand;
use crate::signaling::ConnectionHub;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use screenlink_core::{ClientMessage, ConnectionId, ErrorCode, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<ConnectionHub>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: ConnectionHub) {
    let conn_id = ConnectionId::new();
    info!("New WebSocket connection: {}", conn_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    hub.add_connection(conn_id, tx);

    // Ends on its own once the hub drops the sender, which is how server-side close works.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = hub.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            debug!("{} from {}", message.name(), conn_id);
                            let cmd = RelayCommand::Message { conn_id, message };
                            if let Err(e) = hub.relay_tx.send(cmd).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Invalid message from {}: {}", conn_id, e);
                            let reply = ServerMessage::error(ErrorCode::InvalidMessage);
                            hub.send_message(conn_id, &reply);
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    hub.remove_connection(&conn_id);
    let _ = hub
        .relay_tx
        .send(RelayCommand::Disconnected { conn_id })
        .await;

    info!("WebSocket disconnected: {}", conn_id);
}
