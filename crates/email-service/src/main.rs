//! 邮件通知服务
//!
//! 消费 Kafka 下单事件。

use email_service::SERVICE_NAME;
use email_service::consumer::EmailConsumer;
use order_shared::config::AppConfig;
use order_shared::observability;
use order_shared::shutdown::shutdown_signal;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;
    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!(
        environment = %config.environment,
        brokers = %config.kafka.brokers,
        topic = %config.kafka.topic,
        group_id = %config.kafka.consumer_group,
        "Starting email-service..."
    );

    let consumer = EmailConsumer::new(&config)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let run = consumer.run(shutdown_rx);
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result?,
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(true);
            run.await?;
        }
    }

    info!("email-service shutdown complete");
    Ok(())
}
