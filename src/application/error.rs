//! 应用层错误定义
//!
//! 统一的命令错误类型。单元级、页面级错误在处理器内部吸收，
//! 只有文档级错误会以 ApplicationError 形式返回。

use thiserror::Error;

use crate::application::ports::{ReadError, SinkError, StoreError};
use crate::domain::document::DocumentError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 处理范围无效（仅中止当前文档）
    #[error("Invalid range for {document}: {source}")]
    InvalidRange {
        document: String,
        #[source]
        source: DocumentError,
    },

    /// 单元缺失
    #[error("Missing unit {index} in {document}")]
    MissingUnit { document: String, index: usize },

    /// 文档读取错误
    #[error("Read error: {0}")]
    ReadError(String),

    /// 持久化错误（写入、刷新、合并失败）
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 领域错误
    #[error("Domain error: {0}")]
    DomainError(#[from] DocumentError),
}

impl ApplicationError {
    /// 创建范围错误
    pub fn invalid_range(document: impl Into<String>, source: DocumentError) -> Self {
        Self::InvalidRange {
            document: document.into(),
            source,
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<SinkError> for ApplicationError {
    fn from(err: SinkError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<ReadError> for ApplicationError {
    fn from(err: ReadError) -> Self {
        Self::ReadError(err.to_string())
    }
}
