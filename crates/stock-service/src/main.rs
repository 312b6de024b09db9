//! 库存服务
//!
//! 消费 Kafka 下单事件。

use order_shared::config::AppConfig;
use order_shared::observability;
use order_shared::shutdown::shutdown_signal;
use stock_service::SERVICE_NAME;
use stock_service::consumer::StockConsumer;
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
        "Starting stock-service..."
    );

    let consumer = StockConsumer::new(&config)?;
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

    info!("stock-service shutdown complete");
    Ok(())
}
