//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod document_reader;
mod result_sink;
mod sentence_extractor;
mod unit_store;

pub use document_reader::{DocumentReaderPort, ReadError};
pub use result_sink::{ResultSinkFactoryPort, ResultSinkPort, SinkError};
pub use sentence_extractor::{ExtractionError, SentenceExtractorPort};
pub use unit_store::{StoreError, UnitStorePort};
