use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use screenlink_client::{LinkOptions, PeerTransport, TransportEvent, TransportEvents, TransportFactory};
use screenlink_core::{IcePayload, SdpKind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One call the engine made on a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    CreateOffer { ice_restart: bool },
    CreateAnswer,
    SetLocal(SdpKind, String),
    SetRemote(SdpKind, String),
    AddCandidate(String),
    SendData(Bytes),
    Close,
}

/// Failure switches shared by every transport a factory creates.
#[derive(Default)]
pub struct MockBehavior {
    pub fail_create: AtomicBool,
    pub fail_set_remote: AtomicBool,
}

impl MockBehavior {
    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set_remote(&self, fail: bool) {
        self.fail_set_remote.store(fail, Ordering::SeqCst);
    }
}

/// Scripted transport. Candidates whose text starts with `bad` are rejected.
pub struct MockTransport {
    options: LinkOptions,
    events: TransportEvents,
    behavior: Arc<MockBehavior>,
    calls: Mutex<Vec<TransportCall>>,
    offers: AtomicUsize,
}

impl MockTransport {
    pub fn options(&self) -> LinkOptions {
        self.options
    }

    /// Fires a callback as if the underlying connection produced it.
    pub fn emit(&self, event: TransportEvent) {
        self.events.emit(event);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn added_candidates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::AddCandidate(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn ice_restarts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::CreateOffer { ice_restart: true }))
            .count()
    }

    pub fn close_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::Close))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self, ice_restart: bool) -> Result<String> {
        self.record(TransportCall::CreateOffer { ice_restart });
        let n = self.offers.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("offer-{}", n))
    }

    async fn create_answer(&self) -> Result<String> {
        self.record(TransportCall::CreateAnswer);
        Ok("answer".to_owned())
    }

    async fn set_local_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        self.record(TransportCall::SetLocal(kind, sdp));
        Ok(())
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        self.record(TransportCall::SetRemote(kind, sdp));
        if self.behavior.fail_set_remote.load(Ordering::SeqCst) {
            bail!("remote description rejected");
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IcePayload) -> Result<()> {
        let bad = candidate.candidate.starts_with("bad");
        self.record(TransportCall::AddCandidate(candidate.candidate));
        if bad {
            bail!("malformed candidate");
        }
        Ok(())
    }

    async fn send_data(&self, data: Bytes) -> Result<()> {
        self.record(TransportCall::SendData(data));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(TransportCall::Close);
        Ok(())
    }
}

/// Hands out [`MockTransport`]s and keeps every one it created, in order.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    pub behavior: Arc<MockBehavior>,
    created: Arc<Mutex<Vec<Arc<MockTransport>>>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transports(&self) -> Vec<Arc<MockTransport>> {
        self.created.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn latest(&self) -> Arc<MockTransport> {
        self.created
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transport created yet")
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        options: LinkOptions,
        events: TransportEvents,
    ) -> Result<Arc<dyn PeerTransport>> {
        if self.behavior.fail_create.load(Ordering::SeqCst) {
            bail!("transport unavailable");
        }

        let transport = Arc::new(MockTransport {
            options,
            events,
            behavior: self.behavior.clone(),
            calls: Mutex::new(Vec::new()),
            offers: AtomicUsize::new(0),
        });
        self.created.lock().unwrap().push(transport.clone());
        Ok(transport)
    }
}
