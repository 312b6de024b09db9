//! 订单事件契约
//!
//! 订单服务发布到 Kafka 的消息格式。各消费服务只读取、记录，不修改也不持久化，
//! 因此这里只提供只读的数据结构和构造函数。

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// 订单明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub name: String,
    pub qty: i32,
    pub price: f64,
}

impl Order {
    pub fn new(order_id: impl Into<String>, name: impl Into<String>, qty: i32, price: f64) -> Self {
        Self {
            order_id: order_id.into(),
            name: name.into(),
            qty,
            price,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order(orderId={}, name={}, qty={}, price={})",
            self.order_id, self.name, self.qty, self.price
        )
    }
}

// ---------------------------------------------------------------------------
// OrderEvent
// ---------------------------------------------------------------------------

/// 下单事件
///
/// JSON 字段使用 camelCase，与上游订单服务的序列化格式保持一致。
/// `message` 和 `status` 缺失时取空字符串，`order` 必须存在。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    pub order: Order,
}

impl OrderEvent {
    pub fn new(message: impl Into<String>, status: impl Into<String>, order: Order) -> Self {
        Self {
            message: message.into(),
            status: status.into(),
            order,
        }
    }
}

/// 日志中使用的文本表示
impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrderEvent(message={}, status={}, order={})",
            self.message, self.status, self.order
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_event_display() {
        let event = OrderEvent::new(
            "order status is in pending state",
            "PENDING",
            Order::new("1", "X", 2, 9.5),
        );

        assert_eq!(
            event.to_string(),
            "OrderEvent(message=order status is in pending state, status=PENDING, \
             order=Order(orderId=1, name=X, qty=2, price=9.5))"
        );
    }

    #[test]
    fn test_deserialize_camel_case_payload() {
        let payload = r#"{
            "message": "order status is in pending state",
            "status": "PENDING",
            "order": {"orderId": "a1b2", "name": "keyboard", "qty": 3, "price": 49.99}
        }"#;

        let event: OrderEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.status, "PENDING");
        assert_eq!(event.order.order_id, "a1b2");
        assert_eq!(event.order.name, "keyboard");
        assert_eq!(event.order.qty, 3);
        assert_eq!(event.order.price, 49.99);
    }

    #[test]
    fn test_deserialize_tolerates_missing_and_unknown_fields() {
        let payload = r#"{
            "order": {"orderId": "7", "name": "mouse", "qty": 1, "price": 10.0},
            "traceId": "ignored"
        }"#;

        let event: OrderEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.message, "");
        assert_eq!(event.status, "");
        assert_eq!(event.order.order_id, "7");
    }

    #[test]
    fn test_deserialize_requires_order() {
        let payload = r#"{"message": "m", "status": "PENDING"}"#;
        let result: Result<OrderEvent, _> = serde_json::from_str(payload);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let event = OrderEvent::new("m", "PENDING", Order::new("1", "X", 2, 1.0));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["order"]["orderId"], "1");
        assert!(json["order"].get("order_id").is_none());
    }
}
