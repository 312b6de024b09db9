//! 库存服务错误类型

use order_shared::error::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error(transparent)]
    Shared(#[from] ServiceError),
}
