use async_trait::async_trait;
use screenlink_client::SignalSink;
use screenlink_core::{ConnectionId, IcePayload};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// A signal the engine asked to relay.
#[derive(Debug, Clone, PartialEq)]
pub enum SentSignal {
    Offer { target: ConnectionId, sdp: String },
    Answer { target: ConnectionId, sdp: String },
    Ice { target: ConnectionId, candidate: String },
}

/// Mock SignalSink that captures outgoing signals.
#[derive(Clone)]
pub struct MockSignalSink {
    tx: mpsc::UnboundedSender<SentSignal>,
    sent: Arc<Mutex<Vec<SentSignal>>>,
}

impl MockSignalSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SentSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (sink, rx)
    }

    pub async fn sent(&self) -> Vec<SentSignal> {
        self.sent.lock().await.clone()
    }

    async fn record(&self, signal: SentSignal) {
        self.sent.lock().await.push(signal.clone());
        let _ = self.tx.send(signal);
    }
}

#[async_trait]
impl SignalSink for MockSignalSink {
    async fn send_offer(&self, target: ConnectionId, sdp: String) {
        tracing::debug!("[MockSignalSink] offer to {}", target);
        self.record(SentSignal::Offer { target, sdp }).await;
    }

    async fn send_answer(&self, target: ConnectionId, sdp: String) {
        tracing::debug!("[MockSignalSink] answer to {}", target);
        self.record(SentSignal::Answer { target, sdp }).await;
    }

    async fn send_ice_candidate(&self, target: ConnectionId, candidate: IcePayload) {
        tracing::debug!("[MockSignalSink] candidate to {}", target);
        self.record(SentSignal::Ice {
            target,
            candidate: candidate.candidate,
        })
        .await;
    }
}
