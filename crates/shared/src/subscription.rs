//! Topic 订阅注册表
//!
//! 服务启动时显式登记 "topic -> 处理器"，消费循环按消息所属 topic 分发。
//! 订阅关系集中在启动代码里，读 main 就能知道一个服务消费哪些 topic。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ServiceError;
use crate::events::OrderEvent;
use crate::kafka::ConsumerMessage;
use crate::observability::metrics::record_message_consumed;

/// 单个 topic 的消息处理器
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, msg: &ConsumerMessage) -> Result<(), ServiceError>;
}

/// 将同步的订单事件处理函数适配为 [`MessageHandler`]
///
/// 先把 JSON 负载解码为 [`OrderEvent`]，再以只读引用交给处理函数；
/// 解码失败直接返回错误，不调用处理函数。
pub struct OrderEventHandler<F> {
    consume: F,
}

impl<F> OrderEventHandler<F>
where
    F: Fn(&OrderEvent) + Send + Sync,
{
    pub fn new(consume: F) -> Self {
        Self { consume }
    }
}

#[async_trait]
impl<F> MessageHandler for OrderEventHandler<F>
where
    F: Fn(&OrderEvent) + Send + Sync,
{
    async fn handle(&self, msg: &ConsumerMessage) -> Result<(), ServiceError> {
        let event: OrderEvent = msg.deserialize_payload()?;
        (self.consume)(&event);
        Ok(())
    }
}

/// topic 到处理器的映射
#[derive(Default, Clone)]
pub struct Subscriptions {
    handlers: BTreeMap<String, Arc<dyn MessageHandler>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 topic 登记处理器，重复登记时新处理器替换旧的
    pub fn register(&mut self, topic: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        let topic = topic.into();
        if self.handlers.insert(topic.clone(), handler).is_some() {
            warn!(%topic, "topic 已有处理器，旧处理器被替换");
        }
    }

    /// 已登记的 topic，按名称排序
    pub fn topics(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 按消息所属 topic 分发到对应处理器
    pub async fn dispatch(&self, msg: &ConsumerMessage) -> Result<(), ServiceError> {
        let Some(handler) = self.handlers.get(&msg.topic) else {
            record_message_consumed(&msg.topic, "unroutable");
            return Err(ServiceError::UnroutableTopic {
                topic: msg.topic.clone(),
            });
        };

        let result = handler.handle(msg).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        record_message_consumed(&msg.topic, status);
        result
    }
}
