//! Document Context - 文档限界上下文
//!
//! 职责:
//! - 原始页面与内容单元实体
//! - 处理范围解析
//! - 文档摘要

mod entities;
mod errors;
mod summary;
mod value_objects;

pub use entities::{ContentUnit, ExtractionResult, RawPage};
pub use errors::DocumentError;
pub use summary::{DocumentSummary, PageUnitCount};
pub use value_objects::{DocumentFormat, DocumentName, ProcessingRange};
