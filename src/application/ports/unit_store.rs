//! Unit Store Port - 内容单元持久化
//!
//! 每个文档一组按 global_index 寻址的单元，外加一份文档摘要。
//! 调用方不依赖具体的存储形式（目录、数据库等）。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::document::{ContentUnit, DocumentName, DocumentSummary};

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Unit Store Port
#[async_trait]
pub trait UnitStorePort: Send + Sync {
    /// 清空文档已有的单元（重新导入前调用）
    async fn reset_document(&self, document: &DocumentName) -> Result<(), StoreError>;

    /// 写入单元；同一索引重复写入会覆盖
    async fn create_unit(
        &self,
        document: &DocumentName,
        unit: &ContentUnit,
    ) -> Result<(), StoreError>;

    /// 读取单个单元，不存在时返回 None
    async fn read_unit(
        &self,
        document: &DocumentName,
        global_index: usize,
    ) -> Result<Option<ContentUnit>, StoreError>;

    /// 按 global_index 升序列出全部单元
    async fn list_units(&self, document: &DocumentName) -> Result<Vec<ContentUnit>, StoreError>;

    /// 已持久化的单元数
    async fn unit_count(&self, document: &DocumentName) -> Result<usize, StoreError>;

    /// 保存文档摘要
    async fn save_summary(&self, summary: &DocumentSummary) -> Result<(), StoreError>;

    /// 读取文档摘要
    async fn load_summary(
        &self,
        document: &DocumentName,
    ) -> Result<Option<DocumentSummary>, StoreError>;

    /// 列出所有已导入的文档（按名称排序）
    async fn list_documents(&self) -> Result<Vec<DocumentName>, StoreError>;
}
