//! 共享库
//!
//! 订单事件契约，以及各消费服务共用的配置、错误处理、Kafka 消费、订阅注册和可观测性代码。

pub mod config;
pub mod error;
pub mod events;
pub mod kafka;
pub mod observability;
pub mod shutdown;
pub mod subscription;
pub mod test_utils;
