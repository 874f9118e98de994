//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（DocumentReader、UnitStore、SentenceExtractor、ResultSink）
//! - commands: 导入与提取命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{
        DocumentOutcome, DriverConfig, IngestDocumentHandler, IngestReport, LibraryReport,
        RunExtractionHandler, RunLibraryHandler, RunSummary,
    },
    RunExtraction, RunLibraryExtraction,
};

pub use error::ApplicationError;

pub use ports::{
    DocumentReaderPort, ExtractionError, ReadError, ResultSinkFactoryPort, ResultSinkPort,
    SentenceExtractorPort, SinkError, StoreError, UnitStorePort,
};
