//! Kafka 基础设施封装
//!
//! 将 rdkafka 的底层 API 封装为业务友好的 Consumer 抽象，
//! 统一消息所有权转换、错误映射和优雅关闭语义，避免各服务重复编写样板代码。

use std::collections::HashMap;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Headers, Message};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::KafkaConfig;
use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// ConsumerMessage
// ---------------------------------------------------------------------------

/// 消费到的 Kafka 消息的统一表示
///
/// 将 rdkafka 的 `BorrowedMessage`（带生命周期约束）转换为拥有所有权的结构体，
/// 使消息可以安全地跨 await 点传递给异步处理函数。
#[derive(Debug, Clone)]
pub struct ConsumerMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub timestamp: Option<i64>,
    pub headers: HashMap<String, String>,
}

impl ConsumerMessage {
    /// 构造一条只有 topic 和负载的消息，分区与位点置零
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            partition: 0,
            offset: 0,
            key: None,
            payload: payload.into(),
            timestamp: None,
            headers: HashMap::new(),
        }
    }

    /// 从 rdkafka 的借用消息构造，提取并拥有所有字段
    fn from_borrowed(msg: &BorrowedMessage<'_>) -> Self {
        let key = msg
            .key()
            .and_then(|k| std::str::from_utf8(k).ok())
            .map(String::from);

        let payload = msg.payload().map(|p| p.to_vec()).unwrap_or_default();

        let mut headers = HashMap::new();
        if let Some(h) = msg.headers() {
            for header in h.iter() {
                if let Some(raw) = header.value
                    && let Ok(value) = std::str::from_utf8(raw)
                {
                    headers.insert(header.key.to_string(), value.to_string());
                }
            }
        }

        Self {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key,
            payload,
            timestamp: msg.timestamp().to_millis(),
            headers,
        }
    }

    /// 将负载视为 UTF-8 字符串返回
    pub fn payload_str(&self) -> Result<&str, ServiceError> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| ServiceError::Deserialization(format!("负载非 UTF-8 编码: {e}")))
    }

    /// 将 JSON 格式负载反序列化为目标类型
    pub fn deserialize_payload<T: DeserializeOwned>(&self) -> Result<T, ServiceError> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| ServiceError::Deserialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// KafkaConsumer
// ---------------------------------------------------------------------------

/// 面向业务的 Kafka 消费者
///
/// 封装 `StreamConsumer` 并提供基于 `watch` channel 的优雅关闭语义，
/// 确保进程退出时不会中断正在处理的消息。
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    group_id: String,
}

impl KafkaConsumer {
    /// 按配置中的消费组创建消费者
    ///
    /// 位点自动提交：处理失败的消息不会被重投，与"失败交给客户端默认行为"的约定一致。
    pub fn new(config: &KafkaConfig) -> Result<Self, ServiceError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.consumer_group)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("session.timeout.ms", config.session_timeout_ms.to_string())
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| ServiceError::Kafka(format!("创建消费者失败: {e}")))?;

        info!(
            brokers = %config.brokers,
            group_id = %config.consumer_group,
            "Kafka 消费者已初始化"
        );
        Ok(Self {
            consumer,
            group_id: config.consumer_group.clone(),
        })
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// 订阅指定的 topic 列表
    pub fn subscribe(&self, topics: &[&str]) -> Result<(), ServiceError> {
        self.consumer
            .subscribe(topics)
            .map_err(|e| ServiceError::Kafka(format!("订阅 topic 失败: {e}")))?;

        info!(?topics, group_id = %self.group_id, "已订阅 Kafka topics");
        Ok(())
    }

    /// 启动消费循环
    ///
    /// 使用 `tokio::select!` 同时监听消息流和关闭信号：
    /// - 收到消息时调用 handler 处理；handler 返回错误只记录日志而不中断循环，
    ///   避免单条坏消息导致整个消费者停止。
    /// - 关闭信号变为 `true` 时退出循环，正在执行的 handler 会先自然完成。
    pub async fn start<F, Fut>(self, mut shutdown: watch::Receiver<bool>, handler: F)
    where
        F: Fn(ConsumerMessage) -> Fut,
        Fut: std::future::Future<Output = Result<(), ServiceError>>,
    {
        use futures::StreamExt;

        let stream = self.consumer.stream();
        futures::pin_mut!(stream);

        info!(group_id = %self.group_id, "Kafka 消费循环已启动");

        loop {
            tokio::select! {
                // 偏向关闭信号，保证收到关闭时能尽快退出
                biased;

                changed = shutdown.changed() => {
                    // 发送端被 drop 同样视为关闭
                    if changed.is_err() || *shutdown.borrow() {
                        info!("收到关闭信号，Kafka 消费循环退出");
                        break;
                    }
                }

                msg_result = stream.next() => {
                    let Some(msg_result) = msg_result else {
                        warn!("Kafka 消息流意外结束");
                        break;
                    };

                    match msg_result {
                        Ok(borrowed_msg) => {
                            let msg = ConsumerMessage::from_borrowed(&borrowed_msg);
                            let (topic, partition, offset) =
                                (msg.topic.clone(), msg.partition, msg.offset);
                            debug!(%topic, partition, offset, "收到 Kafka 消息");

                            if let Err(e) = handler(msg).await {
                                error!(
                                    error = %e,
                                    code = e.code(),
                                    %topic,
                                    partition,
                                    offset,
                                    "处理 Kafka 消息失败"
                                );
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "接收 Kafka 消息出错");
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 测试
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_message_creation() {
        let msg = ConsumerMessage {
            topic: "order_topics".to_string(),
            partition: 2,
            offset: 42,
            key: Some("order-1".to_string()),
            payload: b"hello".to_vec(),
            timestamp: Some(1_700_000_000_000),
            headers: HashMap::from([("__TypeId__".to_string(), "OrderEvent".to_string())]),
        };

        assert_eq!(msg.partition, 2);
        assert_eq!(msg.offset, 42);
        assert_eq!(msg.key.as_deref(), Some("order-1"));
        assert_eq!(msg.headers.get("__TypeId__").unwrap(), "OrderEvent");
    }

    #[test]
    fn test_consumer_message_new_defaults() {
        let msg = ConsumerMessage::new("order_topics", b"{}".to_vec());
        assert_eq!(msg.topic, "order_topics");
        assert_eq!(msg.partition, 0);
        assert_eq!(msg.offset, 0);
        assert!(msg.key.is_none());
        assert!(msg.headers.is_empty());
    }

    #[test]
    fn test_consumer_message_deserialize() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Ping {
            seq: u32,
        }

        let msg = ConsumerMessage::new("pings", r#"{"seq":7}"#);
        let ping: Ping = msg.deserialize_payload().unwrap();
        assert_eq!(ping, Ping { seq: 7 });
    }

    #[test]
    fn test_consumer_message_deserialize_invalid_json() {
        let msg = ConsumerMessage::new("order_topics", b"not json".to_vec());

        let result: Result<serde_json::Value, _> = msg.deserialize_payload();
        assert!(matches!(result, Err(ServiceError::Deserialization(_))));
    }

    #[test]
    fn test_consumer_message_payload_str() {
        let msg = ConsumerMessage::new("t", b"hello world".to_vec());
        assert_eq!(msg.payload_str().unwrap(), "hello world");

        let invalid = ConsumerMessage::new("t", vec![0xFF, 0xFE]);
        assert!(invalid.payload_str().is_err());
    }
}
