//! 统一错误处理模块
//!
//! 定义各消费服务共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 共享基础设施错误
#[derive(Debug, Error)]
pub enum ServiceError {
    // ==================== Kafka 错误 ====================
    #[error("Kafka 错误: {0}")]
    Kafka(String),

    #[error("消息反序列化失败: {0}")]
    Deserialization(String),

    #[error("topic 未注册处理器: {topic}")]
    UnroutableTopic { topic: String },

    // ==================== 配置错误 ====================
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Kafka(_) => "KAFKA_ERROR",
            Self::Deserialization(_) => "DESERIALIZATION_ERROR",
            Self::UnroutableTopic { .. } => "UNROUTABLE_TOPIC",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 只有 broker 侧的瞬时故障值得重试；坏消息重投多少次结果都一样。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Kafka(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = ServiceError::UnroutableTopic {
            topic: "order_topics".to_string(),
        };
        assert_eq!(err.code(), "UNROUTABLE_TOPIC");
        assert_eq!(err.to_string(), "topic 未注册处理器: order_topics");
    }

    #[test]
    fn test_is_retryable() {
        let kafka_err = ServiceError::Kafka("broker 不可达".to_string());
        assert!(kafka_err.is_retryable());

        let bad_payload = ServiceError::Deserialization("expected value".to_string());
        assert!(!bad_payload.is_retryable());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ServiceError = config::ConfigError::NotFound("kafka.topic".to_string()).into();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
