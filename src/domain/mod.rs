//! Domain Layer - 领域层
//!
//! - Document Context: 页面、内容单元、处理范围
//! - 跨页修复与段落分块（纯函数，无 I/O）

pub mod document;

mod chunker;
mod reconciler;

pub use chunker::{chunk_document, split_into_units, split_with_config, ChunkConfig, DEFAULT_TARGET_SIZE};
pub use reconciler::{reconcile_pages, TerminalMarks, DEFAULT_TERMINAL_MARKS};
