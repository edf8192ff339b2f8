use crate::engine::EngineCommand;
use bytes::Bytes;
use screenlink_core::IcePayload;
use tokio::sync::mpsc;

/// Connection state as reported by the transport itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone)]
pub enum TransportEvent {
    StateChanged(TransportState),
    CandidateGenerated(IcePayload),
    DataChannelOpen,
    Message(Bytes),
}

/// Where a transport reports its callbacks.
///
/// Each handle is stamped with the generation of the transport it was created for, so events
/// from a torn-down transport are recognised and dropped by the engine. The handle holds only
/// a weak reference and never keeps an engine alive.
#[derive(Clone)]
pub struct TransportEvents {
    generation: u64,
    tx: mpsc::WeakUnboundedSender<EngineCommand>,
}

impl TransportEvents {
    pub(crate) fn new(generation: u64, tx: mpsc::WeakUnboundedSender<EngineCommand>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, event: TransportEvent) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let _ = tx.send(EngineCommand::Transport {
            generation: self.generation,
            event,
        });
    }
}
