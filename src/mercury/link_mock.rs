//! Mock meter link for hardware-free tests.
//!
//! Records every frame written and replays queued response bursts, with
//! optional error injection. Clones share the same buffers, so a test can
//! keep one handle while the client under test owns another.

use crate::error::MercuryError;
use crate::mercury::link::MeterLink;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory [`MeterLink`] simulating a meter behind a gateway.
#[derive(Clone, Default)]
pub struct MockLink {
    tx: Arc<Mutex<Vec<Vec<u8>>>>,
    rx: Arc<Mutex<VecDeque<Vec<u8>>>>,
    next_error: Arc<Mutex<Option<MercuryError>>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one response burst to be returned by a later read.
    pub fn queue_response(&self, bytes: &[u8]) {
        self.rx.lock().unwrap().push_back(bytes.to_vec());
    }

    /// Fails the next link operation with a transport error.
    pub fn fail_next(&self, message: &str) {
        *self.next_error.lock().unwrap() = Some(MercuryError::Transport(message.into()));
    }

    /// Frames written so far, in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.tx.lock().unwrap().clone()
    }

    /// Clears both buffers.
    pub fn clear(&self) {
        self.tx.lock().unwrap().clear();
        self.rx.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl MeterLink for MockLink {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<(), MercuryError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        self.tx.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    async fn read_burst(&mut self, _poll: Duration) -> Result<Vec<u8>, MercuryError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        // A real link would keep polling; with no queued response a test
        // is broken, so fail fast instead of hanging.
        self.rx
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| MercuryError::Transport("mock link has no queued response".into()))
    }
}
