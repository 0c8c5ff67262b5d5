//! Command-line publisher for sms-store events
//!
//! ```bash
//! sms-producer sms --mobile-number 9876543210 --message "hi"
//! sms-producer block --mobile-number 9876543210
//! sms-producer unblock --mobile-number 9876543210
//! sms-producer raw --topic sms-topic 'not json'
//! ```

use clap::{Parser, Subcommand};
use sms_store_kafka_producer::EventProducer;
use sms_types::UserStatus;

#[derive(Parser)]
#[command(name = "sms-producer")]
#[command(about = "Publish SMS and user status events for sms-store")]
struct Cli {
    /// Kafka brokers (comma-separated)
    #[arg(long, default_value = "localhost:9092", env = "KAFKA_BROKERS")]
    brokers: String,

    /// Topic for SMS events
    #[arg(long, default_value = "sms-topic", env = "SMS_TOPIC")]
    sms_topic: String,

    /// Topic for user status events
    #[arg(long, default_value = "user-topic", env = "USER_TOPIC")]
    user_topic: String,

    /// Create the topics first with this many partitions
    #[arg(long)]
    create_topics: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish an SMS event
    Sms {
        #[arg(long)]
        mobile_number: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "SUCCESS")]
        status: String,
    },
    /// Publish a BLOCKED status event
    Block {
        #[arg(long)]
        mobile_number: String,
    },
    /// Publish an UNBLOCKED status event
    Unblock {
        #[arg(long)]
        mobile_number: String,
    },
    /// Publish an arbitrary payload, without validation
    Raw {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        key: Option<String>,
        payload: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run_main().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let producer = EventProducer::new(&cli.brokers)?;

    if let Some(partitions) = cli.create_topics {
        producer
            .create_topic_if_not_exists(&cli.sms_topic, partitions)
            .await?;
        producer
            .create_topic_if_not_exists(&cli.user_topic, partitions)
            .await?;
    }

    match cli.command {
        Command::Sms {
            mobile_number,
            message,
            status,
        } => {
            producer
                .send_sms(&cli.sms_topic, &mobile_number, &message, &status)
                .await?;
            println!("Message enqueued for delivery to {mobile_number}");
        }
        Command::Block { mobile_number } => {
            producer
                .send_user_status(&cli.user_topic, &mobile_number, UserStatus::Blocked)
                .await?;
            println!("{mobile_number}: {}", UserStatus::Blocked);
        }
        Command::Unblock { mobile_number } => {
            producer
                .send_user_status(&cli.user_topic, &mobile_number, UserStatus::Unblocked)
                .await?;
            println!("{mobile_number}: {}", UserStatus::Unblocked);
        }
        Command::Raw {
            topic,
            key,
            payload,
        } => {
            producer
                .publish_raw(&topic, key.as_deref(), payload.as_bytes())
                .await?;
            println!("Published {} bytes to {topic}", payload.len());
        }
    }

    Ok(())
}
