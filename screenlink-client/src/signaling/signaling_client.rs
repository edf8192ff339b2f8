use crate::config::SignalingClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::signaling::SignalSink;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use screenlink_core::{
    ClientMessage, ConnectionId, IcePayload, JoinRole, JoinSessionPayload, JoinSessionResponse,
    RegisterHostPayload, RegisterHostResponse, ServerMessage, SignalPayload,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingReply = Arc<Mutex<Option<oneshot::Sender<ServerMessage>>>>;

/// WebSocket connection to the signaling relay.
///
/// Replies to `register-host` / `join-session` (and the error that may replace them) are
/// routed to the waiting request. Everything else is handed out on the event channel
/// returned by [`SignalingClient::connect`].
pub struct SignalingClient {
    config: SignalingClientConfig,
    tx: mpsc::UnboundedSender<Message>,
    pending: PendingReply,
    /// Serializes request/response pairs.
    request_lock: tokio::sync::Mutex<()>,
}

impl SignalingClient {
    pub async fn connect(
        config: SignalingClientConfig,
    ) -> ClientResult<(Self, mpsc::UnboundedReceiver<ServerMessage>)> {
        info!("Connecting to signaling server: {}", config.url);

        let (ws_stream, _) = connect_async(config.url.as_str()).await?;
        info!("Connected to signaling server");

        let (write, read) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let pending: PendingReply = Arc::new(Mutex::new(None));

        tokio::spawn(Self::sender_task(write, rx));
        tokio::spawn(Self::receiver_task(read, pending.clone(), events_tx));

        let client = Self {
            config,
            tx,
            pending,
            request_lock: tokio::sync::Mutex::new(()),
        };
        Ok((client, events_rx))
    }

    async fn sender_task(
        mut write: SplitSink<WsStream, Message>,
        mut rx: mpsc::UnboundedReceiver<Message>,
    ) {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if let Err(e) = write.send(msg).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
            if closing {
                break;
            }
        }

        debug!("Sender task terminated");
    }

    async fn receiver_task(
        mut read: SplitStream<WsStream>,
        pending: PendingReply,
        events_tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let message = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(m) => m,
                        Err(e) => {
                            warn!("Undecodable frame from relay: {}", e);
                            continue;
                        }
                    };

                    if let Some(message) = Self::route_reply(&pending, message) {
                        let _ = events_tx.send(message);
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("Signaling connection closed by relay");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Dropping the waiter fails any request still in flight.
        if let Ok(mut slot) = pending.lock() {
            slot.take();
        }
        debug!("Receiver task terminated");
    }

    /// Hands request replies to the waiter; returns the message if nobody is waiting for it.
    fn route_reply(pending: &PendingReply, message: ServerMessage) -> Option<ServerMessage> {
        let is_reply = matches!(
            message,
            ServerMessage::RegisterHostResponse(_)
                | ServerMessage::JoinSessionResponse(_)
                | ServerMessage::Error(_)
        );
        if !is_reply {
            return Some(message);
        }

        let waiter = pending.lock().ok().and_then(|mut slot| slot.take());
        match waiter {
            Some(waiter) => waiter.send(message).err(),
            None => Some(message),
        }
    }

    fn send(&self, message: &ClientMessage) -> ClientResult<()> {
        let text =
            serde_json::to_string(message).map_err(|e| ClientError::Signaling(e.to_string()))?;
        self.tx
            .send(Message::Text(text.into()))
            .map_err(|_| ClientError::Closed)
    }

    async fn request(&self, message: ClientMessage) -> ClientResult<ServerMessage> {
        let _guard = self.request_lock.lock().await;

        let (reply_tx, reply_rx) = oneshot::channel();
        if let Ok(mut slot) = self.pending.lock() {
            *slot = Some(reply_tx);
        }
        self.send(&message)?;

        let reply = tokio::time::timeout(self.config.join_timeout, reply_rx).await;
        if let Ok(mut slot) = self.pending.lock() {
            slot.take();
        }

        match reply {
            Ok(Ok(ServerMessage::Error(payload))) => Err(ClientError::Protocol(payload.code)),
            Ok(Ok(message)) => Ok(message),
            Ok(Err(_)) => Err(ClientError::Closed),
            Err(_) => Err(ClientError::Timeout(message.name())),
        }
    }

    pub async fn register_host(
        &self,
        payload: RegisterHostPayload,
    ) -> ClientResult<RegisterHostResponse> {
        match self.request(ClientMessage::RegisterHost(payload)).await? {
            ServerMessage::RegisterHostResponse(response) => {
                info!("Registered session {}", response.session_code);
                Ok(response)
            }
            other => Err(ClientError::Signaling(format!("unexpected reply: {:?}", other))),
        }
    }

    pub async fn join_session(
        &self,
        session_code: &str,
        role: JoinRole,
        pin: Option<String>,
    ) -> ClientResult<JoinSessionResponse> {
        let payload = JoinSessionPayload {
            session_code: session_code.to_owned(),
            role,
            pin,
        };

        match self.request(ClientMessage::JoinSession(payload)).await? {
            ServerMessage::JoinSessionResponse(response) => {
                info!("Joined session {} as {}", session_code, role);
                Ok(response)
            }
            other => Err(ClientError::Signaling(format!("unexpected reply: {:?}", other))),
        }
    }

    fn relay(&self, message: ClientMessage) {
        let name = message.name();
        if let Err(e) = self.send(&message) {
            warn!("Failed to relay {}: {}", name, e);
        }
    }

    /// Asks the relay to close the connection. The relay treats this like any disconnect.
    pub fn close(&self) {
        let _ = self.tx.send(Message::Close(None));
    }
}

#[async_trait]
impl SignalSink for SignalingClient {
    async fn send_offer(&self, target: ConnectionId, sdp: String) {
        self.relay(ClientMessage::Offer(SignalPayload::offer(target, sdp)));
    }

    async fn send_answer(&self, target: ConnectionId, sdp: String) {
        self.relay(ClientMessage::Answer(SignalPayload::answer(target, sdp)));
    }

    async fn send_ice_candidate(&self, target: ConnectionId, candidate: IcePayload) {
        self.relay(ClientMessage::IceCandidate(SignalPayload::ice(target, candidate)));
    }
}
