//! The per-topic consumption loop.

use crate::apply::Applier;
use sms_store_kafka::{EventLog, LogMessage};
use sms_types::{Decode, Keyed};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pause after a failed fetch or apply.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Lifecycle of a [`StreamProcessor`].
///
/// `Idle → Running ⇄ Backoff → Stopped`. `Stopped` is reached only through
/// cancellation and is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Running,
    Backoff,
    Stopped,
}

/// Counters reported when a processor stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Events applied and acknowledged (commit may still have failed)
    pub applied: u64,
    /// Undecodable payloads dropped
    pub skipped: u64,
    pub fetch_failures: u64,
    pub apply_failures: u64,
    pub commit_failures: u64,
}

enum Outcome {
    Done,
    Retry,
}

/// Drives one topic: fetch a message, decode it, apply it, commit it.
///
/// Processing is strictly serial, one message in flight, so applies happen in
/// log order. The processor owns its log client and closes it on exit.
pub struct StreamProcessor<L, A> {
    name: String,
    log: L,
    applier: A,
    backoff: Duration,
    state: watch::Sender<ProcessorState>,
    stats: ProcessorStats,
}

impl<L, A> StreamProcessor<L, A>
where
    L: EventLog,
    A: Applier,
{
    pub fn new(name: impl Into<String>, log: L, applier: A) -> Self {
        let (state, _) = watch::channel(ProcessorState::Idle);
        Self {
            name: name.into(),
            log,
            applier,
            backoff: DEFAULT_BACKOFF,
            state,
            stats: ProcessorStats::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<ProcessorState> {
        self.state.subscribe()
    }

    /// Run until `cancel` fires.
    ///
    /// Never fails: transient errors are logged and retried. A message that
    /// was fetched but not applied when cancellation is observed is left
    /// uncommitted and will be redelivered to the next consumer.
    pub async fn run(mut self, cancel: CancellationToken) -> ProcessorStats {
        self.state.send_replace(ProcessorState::Running);
        info!(processor = %self.name, "Stream processor started");

        // Holds a message whose apply failed. Re-fetching would not return it:
        // the client's fetch position has already moved past it.
        let mut redeliver: Option<LogMessage> = None;

        loop {
            let message = match redeliver.take() {
                Some(message) => message,
                None => {
                    let fetched = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        fetched = self.log.fetch() => fetched,
                    };
                    match fetched {
                        Ok(message) => message,
                        Err(e) => {
                            warn!(processor = %self.name, error = %e, "Kafka fetch error");
                            self.stats.fetch_failures += 1;
                            if !self.pause(&cancel).await {
                                break;
                            }
                            continue;
                        }
                    }
                }
            };

            if cancel.is_cancelled() {
                break;
            }

            if let Outcome::Retry = self.process(&message).await {
                redeliver = Some(message);
                if !self.pause(&cancel).await {
                    break;
                }
            }
        }

        self.state.send_replace(ProcessorState::Stopped);
        if let Err(e) = self.log.close().await {
            warn!(processor = %self.name, error = %e, "Failed to close event log");
        }
        info!(processor = %self.name, stats = ?self.stats, "Stream processor stopped");
        self.stats
    }

    async fn process(&mut self, message: &LogMessage) -> Outcome {
        let event = match A::Event::decode(&message.payload) {
            Ok(event) => event,
            Err(e) => {
                // Poison message: drop it so the partition keeps moving
                warn!(
                    processor = %self.name,
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    payload = %e.raw,
                    "Failed to decode message, skipping"
                );
                self.stats.skipped += 1;
                self.commit(message).await;
                return Outcome::Done;
            }
        };

        if let Err(e) = self.applier.apply(&event).await {
            warn!(
                processor = %self.name,
                mobile_number = %event.key(),
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                error = %e,
                "Failed to apply event, will retry"
            );
            self.stats.apply_failures += 1;
            return Outcome::Retry;
        }

        self.stats.applied += 1;
        if self.commit(message).await {
            info!(
                processor = %self.name,
                mobile_number = %event.key(),
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                "Processed message"
            );
        }
        Outcome::Done
    }

    async fn commit(&mut self, message: &LogMessage) -> bool {
        match self.log.commit(message).await {
            Ok(()) => {
                debug!(
                    processor = %self.name,
                    partition = message.partition,
                    offset = message.offset,
                    "Committed offset"
                );
                true
            }
            Err(e) => {
                warn!(
                    processor = %self.name,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Failed to commit message"
                );
                self.stats.commit_failures += 1;
                false
            }
        }
    }

    /// Sleep for the backoff interval. Returns false when cancelled instead.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        self.state.send_replace(ProcessorState::Backoff);
        let resumed = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.backoff) => true,
        };
        if resumed {
            self.state.send_replace(ProcessorState::Running);
        }
        resumed
    }
}
