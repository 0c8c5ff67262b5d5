use sms_store_kafka::{ConsumerConfig, EventLog, KafkaConsumer};

/// Print every message of a topic without committing anything
///
/// Useful to inspect what the stream processors will see. Uses a throwaway
/// consumer group so the service's committed offsets are untouched.
///
/// To run this example:
/// 1. Start Kafka with Docker
///   docker run -d --name kafka -p 9092:9092 apache/kafka:latest
/// 2. Run the example
///   cargo run -p sms-store-kafka --example tail_topic -- sms-topic

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    match run_main().await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let topic = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sms-topic".to_string());
    let brokers = std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());

    let config = ConsumerConfig {
        brokers,
        group_id: format!("sms-store-tail-{}", std::process::id()),
        topic,
        ..Default::default()
    };
    let consumer = KafkaConsumer::new(&config)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            fetched = consumer.fetch() => {
                let message = fetched?;
                println!(
                    "{}[{}]@{}: {}",
                    message.topic,
                    message.partition,
                    message.offset,
                    String::from_utf8_lossy(&message.payload)
                );
            }
        }
    }

    consumer.close().await?;
    Ok(())
}
