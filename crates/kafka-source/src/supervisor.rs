//! Runs stream processors as supervised tasks.

use crate::apply::Applier;
use crate::processor::{ProcessorStats, StreamProcessor};
use anyhow::anyhow;
use sms_store_kafka::EventLog;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Owns the tasks of every running processor.
///
/// All processors share one cancellation token. Shutdown cancels it and waits
/// for each task up to a deadline; panics and overruns are reported as errors
/// instead of being lost with a detached task.
pub struct Supervisor {
    cancel: CancellationToken,
    tasks: Vec<(String, JoinHandle<ProcessorStats>)>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Token cancelled on shutdown. Other components (the HTTP server) can
    /// use it to stop together with the processors.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Start `processor` on its own task.
    pub fn spawn<L, A>(&mut self, processor: StreamProcessor<L, A>)
    where
        L: EventLog + 'static,
        A: Applier + 'static,
    {
        let name = processor.name().to_string();
        let handle = tokio::spawn(processor.run(self.cancel.child_token()));
        info!(processor = %name, "Spawned stream processor");
        self.tasks.push((name, handle));
    }

    /// Names of the processors still supervised.
    pub fn processors(&self) -> Vec<&str> {
        self.tasks.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Resolves when a processor task ends before shutdown was requested.
    ///
    /// Processors only stop on cancellation, so this means the task panicked.
    /// The task is removed from supervision. Cancel safe; never resolves when
    /// nothing is supervised.
    pub async fn unexpected_exit(&mut self) -> anyhow::Error {
        if self.tasks.is_empty() {
            return std::future::pending().await;
        }
        let (result, index, _) =
            futures::future::select_all(self.tasks.iter_mut().map(|(_, handle)| handle)).await;
        let (name, _) = self.tasks.remove(index);
        match result {
            Ok(stats) => anyhow!("processor {name} stopped unexpectedly ({stats:?})"),
            Err(e) => task_failure(&name, e),
        }
    }

    /// Cancel every processor and wait for them to stop.
    ///
    /// Tasks still running at `deadline` are aborted. Returns the stats of
    /// the processors that stopped cleanly, or an error naming every one that
    /// did not.
    pub async fn shutdown(self, deadline: Duration) -> anyhow::Result<Vec<(String, ProcessorStats)>> {
        info!("Stopping {} stream processors", self.tasks.len());
        self.cancel.cancel();

        let deadline = tokio::time::Instant::now() + deadline;
        let mut stopped = Vec::new();
        let mut failures = Vec::new();

        for (name, mut handle) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(stats)) => {
                    info!(processor = %name, stats = ?stats, "Stream processor joined");
                    stopped.push((name, stats));
                }
                Ok(Err(e)) => {
                    let failure = task_failure(&name, e);
                    error!("{failure}");
                    failures.push(failure.to_string());
                }
                Err(_) => {
                    error!(processor = %name, "Stream processor missed the shutdown deadline, aborting");
                    handle.abort();
                    failures.push(format!("processor {name} did not stop before the deadline"));
                }
            }
        }

        if failures.is_empty() {
            Ok(stopped)
        } else {
            Err(anyhow!("shutdown incomplete: {}", failures.join("; ")))
        }
    }
}

fn task_failure(name: &str, e: JoinError) -> anyhow::Error {
    if e.is_panic() {
        anyhow!("processor {name} panicked: {e}")
    } else {
        anyhow!("processor {name} was aborted: {e}")
    }
}
