//! Reader Adapter - 文档读取器实现

mod text_reader;

pub use text_reader::TextDocumentReader;
