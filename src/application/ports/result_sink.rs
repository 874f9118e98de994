//! Result Sink Port - 提取结果汇总输出
//!
//! 驱动层按单元顺序把结果交给 sink，运行结束时调用 finalize。

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::document::{DocumentName, ExtractionResult, ProcessingRange};

/// 输出错误（对当前文档是致命的）
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Corrupted artifact: {0}")]
    Corrupted(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::IoError(err.to_string())
    }
}

/// Result Sink Port
///
/// 每个文档每次运行独占一个实例
#[async_trait]
pub trait ResultSinkPort: Send {
    /// 接收一个单元的提取结果
    async fn accept(&mut self, result: ExtractionResult) -> Result<(), SinkError>;

    /// 写出剩余内容并生成最终文件，返回最终文件路径（没有任何输出时为 None）
    async fn finalize(&mut self) -> Result<Option<PathBuf>, SinkError>;

    /// 上次中断后可以继续的单元索引
    fn resume_point(&self) -> Option<usize> {
        None
    }
}

/// 为每个文档创建 sink
#[async_trait]
pub trait ResultSinkFactoryPort: Send + Sync {
    async fn open(
        &self,
        document: &DocumentName,
        range: &ProcessingRange,
    ) -> Result<Box<dyn ResultSinkPort>, SinkError>;
}
