//! 测试工具模块
//!
//! 提供测试数据构造和日志捕获，用于断言消费者输出了哪些日志记录。

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

use crate::events::{Order, OrderEvent};
use crate::kafka::ConsumerMessage;

// ==================== 测试数据 ====================

/// 构造测试用订单事件
pub fn order_event(order_id: &str, name: &str, qty: i32) -> OrderEvent {
    OrderEvent::new(
        "order status is in pending state",
        "PENDING",
        Order::new(order_id, name, qty, 25.0),
    )
}

/// 将订单事件序列化为 Kafka 消息
pub fn order_message(topic: &str, event: &OrderEvent) -> ConsumerMessage {
    let payload = serde_json::to_vec(event).expect("序列化测试事件失败");
    let mut msg = ConsumerMessage::new(topic, payload);
    msg.key = Some(event.order.order_id.clone());
    msg
}

// ==================== 日志捕获 ====================

/// 被捕获的一条日志记录
#[derive(Debug, Clone)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    /// `message` 字段的文本
    pub message: String,
    /// 其余字段，按 `name=value` 形式依次拼接
    pub fields: String,
}

impl CapturedRecord {
    /// 消息或任一字段中是否包含指定文本
    pub fn contains(&self, needle: &str) -> bool {
        self.message.contains(needle) || self.fields.contains(needle)
    }
}

/// 收集日志事件的 tracing layer
///
/// 与 `tracing::subscriber::with_default` 配合使用，只影响当前线程，
/// 并行运行的测试之间互不干扰。
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造挂载了本 layer 的 subscriber
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        Registry::default().with(self.clone())
    }

    /// 当前已捕获的记录快照
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// 指定级别的记录
    pub fn records_at(&self, level: Level) -> Vec<CapturedRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let record = CapturedRecord {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        };

        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: String,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, "{}={} ", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, "{}={:?} ", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_capture_collects_message_and_fields() {
        let capture = LogCapture::new();

        tracing::subscriber::with_default(capture.subscriber(), || {
            tracing::info!(order_id = "42", "order received");
            tracing::warn!("second");
        });

        let records = capture.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "order received");
        assert!(records[0].contains("order_id=42"));
        assert_eq!(capture.records_at(Level::WARN).len(), 1);
    }

    #[test]
    fn test_order_message_uses_order_id_as_key() {
        let event = order_event("9", "cable", 4);
        let msg = order_message("order_topics", &event);

        assert_eq!(msg.key.as_deref(), Some("9"));
        let decoded: OrderEvent = msg.deserialize_payload().unwrap();
        assert_eq!(decoded, event);
    }
}
