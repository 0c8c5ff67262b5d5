use sms_store_kafka::MemoryLog;
use sms_store_kafka_source::{SmsApplier, StreamProcessor, Supervisor, UserStatusApplier};
use sms_store_mongodb::{MemoryStore, SmsRepository, UserRepository};
use sms_types::UserStatus;
use std::sync::Arc;
use std::time::Duration;

/// Example running both stream processors against in-memory backends
///
/// This example shows how to:
/// 1. Wire a processor per topic with its own log and a shared store
/// 2. Run them under a supervisor
/// 3. Feed well-formed and malformed events
/// 4. Shut down and read back the stored state
///
/// To run this example:
///   cargo run -p sms-store-kafka-source --example memory_pipeline

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
    let store = Arc::new(MemoryStore::new());
    let sms_log = Arc::new(MemoryLog::new("sms-topic"));
    let user_log = Arc::new(MemoryLog::new("user-topic"));

    let mut supervisor = Supervisor::new();
    supervisor.spawn(StreamProcessor::new(
        "sms",
        sms_log.clone(),
        SmsApplier::new(SmsRepository::new(store.clone())),
    ));
    supervisor.spawn(StreamProcessor::new(
        "user",
        user_log.clone(),
        UserStatusApplier::new(UserRepository::new(store.clone())),
    ));

    sms_log.push(r#"{"mobileNumber":"9876543210","message":"hi","status":"PENDING"}"#);
    sms_log.push("not json at all");
    user_log.push(r#"{"mobileNumber":"9876543210","status":"blocked"}"#);
    user_log.push(r#"{"mobileNumber":"9876543210","status":"unblocked"}"#);

    while sms_log.committed().len() < 2 || user_log.committed().len() < 2 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for (name, stats) in supervisor.shutdown(Duration::from_secs(5)).await? {
        println!("{name}: {stats:?}");
    }

    let messages = SmsRepository::new(store.clone())
        .get_by_mobile_number("9876543210")
        .await?;
    println!("messages for 9876543210: {messages:?}");

    let unblocked = UserRepository::new(store)
        .get_by_status(UserStatus::Unblocked)
        .await?;
    println!("unblocked users: {unblocked:?}");

    Ok(())
}
