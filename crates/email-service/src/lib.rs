//! 邮件通知服务
//!
//! 从 Kafka 消费下单事件并记录收到的事件。邮件发送尚未接入，
//! 当前每条事件只产生一条 info 日志。

pub mod consumer;
pub mod error;

/// 服务名，同时用作配置文件名和默认消费组
pub const SERVICE_NAME: &str = "email-service";
