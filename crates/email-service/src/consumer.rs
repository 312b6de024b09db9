//! 下单事件消费者
//!
//! 订阅订单 topic，每收到一条事件输出一条 info 日志。

use std::sync::Arc;

use order_shared::config::AppConfig;
use order_shared::events::OrderEvent;
use order_shared::kafka::KafkaConsumer;
use order_shared::subscription::{OrderEventHandler, Subscriptions};
use tokio::sync::watch;
use tracing::info;

use crate::error::EmailError;

/// 处理一条下单事件：只记录一条日志，不做其他处理
pub fn consume_order(event: &OrderEvent) {
    info!("Order event received in email service => {event}");
}

/// 构建本服务的订阅表：订单 topic -> [`consume_order`]
pub fn subscriptions(topic: &str) -> Subscriptions {
    let mut subscriptions = Subscriptions::new();
    subscriptions.register(topic, Arc::new(OrderEventHandler::new(consume_order)));
    subscriptions
}

/// 邮件服务消费者
pub struct EmailConsumer {
    consumer: KafkaConsumer,
    subscriptions: Subscriptions,
}

impl EmailConsumer {
    pub fn new(config: &AppConfig) -> Result<Self, EmailError> {
        let consumer = KafkaConsumer::new(&config.kafka)?;
        Ok(Self {
            consumer,
            subscriptions: subscriptions(&config.kafka.topic),
        })
    }

    /// 启动消费循环，直到收到 shutdown 信号
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), EmailError> {
        let Self {
            consumer,
            subscriptions,
        } = self;

        consumer.subscribe(&subscriptions.topics())?;
        info!(
            topics = ?subscriptions.topics(),
            group_id = consumer.group_id(),
            "邮件服务消费者已启动"
        );

        consumer
            .start(shutdown, |msg| {
                let subscriptions = &subscriptions;
                async move { subscriptions.dispatch(&msg).await }
            })
            .await;

        info!("邮件服务消费者已停止");
        Ok(())
    }
}
