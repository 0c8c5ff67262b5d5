//! Command-line interface for sms-store
//!
//! # Usage Examples
//!
//! ```bash
//! # Run against local services
//! sms-store serve \
//!   --mongo-uri mongodb://localhost:27017 \
//!   --kafka-brokers localhost:9092 \
//!   --http-bind 127.0.0.1:8081
//!
//! # Same, configured through the environment
//! MONGO_URI=mongodb://mongo:27017 KAFKA_BROKERS=kafka:9092 RUST_LOG=info sms-store serve
//! ```
//!
//! # Read API
//! - `GET /v1/user/{mobileNumber}/messages`
//! - `GET /v1/users/{blocked|unblocked}/filter`

use clap::{Parser, Subcommand};
use sms_store::ServeOpts;

#[derive(Parser)]
#[command(name = "sms-store")]
#[command(about = "Persist SMS and user status events from Kafka into MongoDB")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume both topics and serve the read API until SIGINT/SIGTERM
    Serve {
        #[command(flatten)]
        opts: ServeOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { opts } => {
            tracing::info!(
                "Starting sms-store: topics {} and {} on {}",
                opts.kafka.sms_topic,
                opts.kafka.user_topic,
                opts.kafka.kafka_brokers.join(",")
            );
            sms_store::serve(opts).await
        }
    }
}
