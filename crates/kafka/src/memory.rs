//! In-process event log.

use crate::error::{Error, Result};
use crate::log::{EventLog, LogMessage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Single-partition [`EventLog`] held in memory.
///
/// Messages are appended with [`MemoryLog::push`]; `fetch` waits until one is
/// available. Commits are recorded and can be inspected. Fetch and commit
/// failures can be injected to exercise retry paths.
pub struct MemoryLog {
    topic: String,
    sender: mpsc::UnboundedSender<LogMessage>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<LogMessage>>,
    next_offset: AtomicI64,
    committed: Mutex<Vec<i64>>,
    failing_fetches: AtomicUsize,
    failing_commits: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryLog {
    pub fn new(topic: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            topic: topic.into(),
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            next_offset: AtomicI64::new(0),
            committed: Mutex::new(Vec::new()),
            failing_fetches: AtomicUsize::new(0),
            failing_commits: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Append a payload and return its offset.
    pub fn push(&self, payload: impl Into<Vec<u8>>) -> i64 {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        let message = LogMessage {
            topic: self.topic.clone(),
            partition: 0,
            offset,
            key: None,
            payload: payload.into(),
            timestamp: None,
        };
        // The receiver lives as long as self
        let _ = self.sender.send(message);
        offset
    }

    /// Offsets of committed messages, in commit order.
    pub fn committed(&self) -> Vec<i64> {
        self.committed
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// The next `n` fetches fail.
    pub fn fail_next_fetches(&self, n: usize) {
        self.failing_fetches.store(n, Ordering::SeqCst);
    }

    /// The next `n` commits fail.
    pub fn fail_next_commits(&self, n: usize) {
        self.failing_commits.store(n, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl EventLog for MemoryLog {
    async fn fetch(&self) -> Result<LogMessage> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if take_one(&self.failing_fetches) {
            return Err(Error::Consumer("injected fetch failure".to_string()));
        }
        self.receiver.lock().await.recv().await.ok_or(Error::Closed)
    }

    async fn commit(&self, message: &LogMessage) -> Result<()> {
        if take_one(&self.failing_commits) {
            return Err(Error::Commit("injected commit failure".to_string()));
        }
        self.committed
            .lock()
            .map_err(|_| Error::Commit("commit log poisoned".to_string()))?
            .push(message.offset);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
