//! 锁错误类型
//!
//! 锁被占用不是错误——获取操作以 `Ok(false)` 表达竞争失败，
//! 错误类型只覆盖存储通信故障与描述符校验失败。

use thiserror::Error;

/// 锁操作错误
#[derive(Debug, Error)]
pub enum LockError {
    /// 与锁存储通信失败（连接中断、超时、响应异常）
    ///
    /// 协调器自身从不重试此类错误，由调用方决定是否重试整个操作。
    #[error("锁存储操作失败: {0}")]
    Store(String),

    /// 描述符字段不满足协议要求
    #[error("锁描述符无效: {0}")]
    InvalidDescriptor(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, LockError>;

impl LockError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(_) => "STORE_ERROR",
            Self::InvalidDescriptor(_) => "INVALID_DESCRIPTOR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
