//! Process wiring: the two stream processors and the HTTP read API sharing
//! one document store, with coordinated shutdown.

use crate::config::{ServeOpts, ServerOpts};
use crate::http;
use crate::query::QueryService;
use anyhow::{anyhow, Context};
use sms_store_kafka::{EventLog, KafkaConsumer};
use sms_store_kafka_source::{SmsApplier, StreamProcessor, Supervisor, UserStatusApplier};
use sms_store_mongodb::{
    DocumentStore, MongoStore, MongoStoreOpts, SmsRepository, UserRepository,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A running sms-store instance.
pub struct Service {
    supervisor: Supervisor,
    server: Option<JoinHandle<std::io::Result<()>>>,
    local_addr: SocketAddr,
    store: Arc<dyn DocumentStore>,
}

impl Service {
    /// Spawn the SMS and user status processors and start serving HTTP.
    pub async fn start<S, U>(
        store: Arc<dyn DocumentStore>,
        sms_log: S,
        user_log: U,
        opts: &ServerOpts,
    ) -> anyhow::Result<Self>
    where
        S: EventLog + 'static,
        U: EventLog + 'static,
    {
        let mut supervisor = Supervisor::new();
        supervisor.spawn(
            StreamProcessor::new(
                "sms",
                sms_log,
                SmsApplier::new(SmsRepository::new(store.clone())),
            )
            .with_backoff(opts.retry_backoff),
        );
        supervisor.spawn(
            StreamProcessor::new(
                "user-status",
                user_log,
                UserStatusApplier::new(UserRepository::new(store.clone())),
            )
            .with_backoff(opts.retry_backoff),
        );

        let listener = match TcpListener::bind(opts.http_bind).await {
            Ok(listener) => listener,
            Err(e) => {
                // Processors are already running; stop them before bailing.
                if let Err(stop) = supervisor.shutdown(opts.shutdown_timeout).await {
                    warn!("{stop:#}");
                }
                return Err(e).with_context(|| format!("Failed to bind {}", opts.http_bind));
            }
        };
        let local_addr = listener.local_addr()?;

        let app = http::router(QueryService::new(store.clone()));
        let cancel = supervisor.cancellation_token();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await
        });
        info!("HTTP read API listening on {local_addr}");

        Ok(Self {
            supervisor,
            server: Some(server),
            local_addr,
            store,
        })
    }

    /// Address the HTTP server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Resolves when a processor or the HTTP server stops on its own.
    ///
    /// Both are expected to run until shutdown, so any exit is a failure.
    pub async fn failed(&mut self) -> anyhow::Error {
        let outcome = {
            let supervisor = &mut self.supervisor;
            let server = self.server.as_mut();
            tokio::select! {
                e = supervisor.unexpected_exit() => return e,
                outcome = async move {
                    match server {
                        Some(handle) => handle.await,
                        None => std::future::pending().await,
                    }
                } => outcome,
            }
        };
        self.server = None;

        match outcome {
            Ok(Ok(())) => anyhow!("HTTP server stopped unexpectedly"),
            Ok(Err(e)) => anyhow!(e).context("HTTP server failed"),
            Err(e) => anyhow!("HTTP server task failed: {e}"),
        }
    }

    /// Stop processors and the HTTP server, then release the store client.
    ///
    /// Everything still running after `timeout` is aborted.
    pub async fn shutdown(self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        // Cancels the shared token, which also starts the HTTP graceful shutdown
        let processors = self.supervisor.shutdown(timeout).await;

        let server = match self.server {
            Some(mut handle) => match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(result)) => result.context("HTTP server failed"),
                Ok(Err(e)) => Err(anyhow!("HTTP server task failed: {e}")),
                Err(_) => {
                    handle.abort();
                    Err(anyhow!("HTTP server did not stop before the deadline"))
                }
            },
            None => Ok(()),
        };

        if let Err(e) = self.store.close().await {
            error!("Failed to close document store: {e}");
        }
        info!("Document store released");

        processors?;
        server
    }
}

/// Run `sms-store serve` until SIGINT/SIGTERM or a component failure.
pub async fn serve(opts: ServeOpts) -> anyhow::Result<()> {
    let mongo_opts = MongoStoreOpts::from(&opts.store);
    let store = MongoStore::connect(&mongo_opts)
        .await
        .with_context(|| format!("Failed to connect to MongoDB at {}", mongo_opts.uri))?;
    info!("Connected to MongoDB database {}", mongo_opts.database);
    let store: Arc<dyn DocumentStore> = Arc::new(store);

    let sms_log = KafkaConsumer::new(&opts.kafka.sms_consumer())
        .context("Failed to create SMS topic consumer")?;
    let user_log = KafkaConsumer::new(&opts.kafka.user_consumer())
        .context("Failed to create user status topic consumer")?;

    let mut service = Service::start(store, sms_log, user_log, &opts.server).await?;

    let failure = tokio::select! {
        signal = shutdown_signal() => {
            signal?;
            info!("Shutdown signal received");
            None
        }
        e = service.failed() => {
            error!("{e:#}");
            Some(e)
        }
    };

    service.shutdown(opts.server.shutdown_timeout).await?;
    info!("sms-store stopped");

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C"),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")
}
