//! 下单事件消费者
//!
//! 每条事件输出两条 info 日志：一条结构化（事件放在 `event` 字段），
//! 一条格式化文本。两条内容重复。

use std::sync::Arc;

use order_shared::config::AppConfig;
use order_shared::events::OrderEvent;
use order_shared::kafka::KafkaConsumer;
use order_shared::subscription::{OrderEventHandler, Subscriptions};
use tokio::sync::watch;
use tracing::info;

use crate::error::StockError;

pub fn consume_order(event: &OrderEvent) {
    info!(event = %event, "Order event received in stock service");
    info!("Order event received in stock service => {event}");
}

/// 订单 topic -> [`consume_order`]
pub fn subscriptions(topic: &str) -> Subscriptions {
    let mut subscriptions = Subscriptions::new();
    subscriptions.register(topic, Arc::new(OrderEventHandler::new(consume_order)));
    subscriptions
}

pub struct StockConsumer {
    consumer: KafkaConsumer,
    subscriptions: Subscriptions,
}

impl StockConsumer {
    pub fn new(config: &AppConfig) -> Result<Self, StockError> {
        Ok(Self {
            consumer: KafkaConsumer::new(&config.kafka)?,
            subscriptions: subscriptions(&config.kafka.topic),
        })
    }

    /// 启动消费循环，直到收到 shutdown 信号
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), StockError> {
        let Self {
            consumer,
            subscriptions,
        } = self;

        consumer.subscribe(&subscriptions.topics())?;
        info!(
            topics = ?subscriptions.topics(),
            group_id = consumer.group_id(),
            "库存服务消费者已启动"
        );

        consumer
            .start(shutdown, |msg| {
                let subscriptions = &subscriptions;
                async move { subscriptions.dispatch(&msg).await }
            })
            .await;

        info!("库存服务消费者已停止");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_shared::test_utils::{LogCapture, order_event, order_message};
    use tracing::Level;

    #[test]
    fn test_consume_order_logs_twice() {
        let capture = LogCapture::new();
        let event = order_event("1", "X", 2);

        tracing::subscriber::with_default(capture.subscriber(), || consume_order(&event));

        let records = capture.records_at(Level::INFO);
        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.contains(&event.to_string()));
            assert!(record.contains("orderId=1"));
            assert!(record.contains("name=X"));
        }
    }

    #[test]
    fn test_structured_record_carries_event_field() {
        let capture = LogCapture::new();
        let event = order_event("1", "X", 2);

        tracing::subscriber::with_default(capture.subscriber(), || consume_order(&event));

        let records = capture.records();
        assert_eq!(records[0].message, "Order event received in stock service");
        assert!(records[0].fields.starts_with("event=OrderEvent("));
        assert!(records[1].fields.is_empty());
    }

    #[test]
    fn test_consume_order_does_not_mutate_event() {
        let event = order_event("3", "widget", 5);
        let before = event.clone();

        tracing::subscriber::with_default(LogCapture::new().subscriber(), || {
            consume_order(&event)
        });

        assert_eq!(event, before);
    }

    #[tokio::test]
    async fn test_dispatch_through_subscriptions() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let event = order_event("1", "X", 2);
        subscriptions("order_topics")
            .dispatch(&order_message("order_topics", &event))
            .await
            .unwrap();

        assert_eq!(capture.records_at(Level::INFO).len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_other_topics() {
        let event = order_event("1", "X", 2);
        let result = subscriptions("order_topics")
            .dispatch(&order_message("payment_topics", &event))
            .await;

        assert!(result.is_err());
    }
}
