//! 库存服务
//!
//! 消费 Kafka 下单事件。库存扣减与事件落库尚未实现，目前只记录收到的事件。

pub mod consumer;
pub mod error;

pub const SERVICE_NAME: &str = "stock-service";
