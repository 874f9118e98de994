//! Document Reader Port - 文档读取抽象
//!
//! 产出按页（或按章）排列的原始文本，具体格式解析在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::document::{DocumentFormat, DocumentName};

/// 读取错误
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Page {index} out of range (total {total})")]
    PageOutOfRange { index: usize, total: usize },

    #[error("Failed to decode page {index}: {reason}")]
    DecodeError { index: usize, reason: String },
}

/// Document Reader Port
///
/// 页码从 1 开始；单页读取失败不影响其他页
#[async_trait]
pub trait DocumentReaderPort: Send + Sync {
    /// 文档名称
    fn document_name(&self) -> &DocumentName;

    /// 文档格式
    fn format(&self) -> DocumentFormat;

    /// 总页数（含无法读取的页）
    fn page_count(&self) -> usize;

    /// 读取指定页的文本
    async fn read_page(&self, index: usize) -> Result<String, ReadError>;
}
