//! 邮件服务错误类型

use order_shared::error::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// 透传共享库错误（Kafka、反序列化、配置）
    #[error(transparent)]
    Shared(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_transparent() {
        let err = EmailError::from(ServiceError::Kafka("broker 不可达".to_string()));
        assert_eq!(err.to_string(), "Kafka 错误: broker 不可达");
    }
}
