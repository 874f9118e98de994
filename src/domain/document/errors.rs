//! Document Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("无效的处理范围: 起始 {start} 大于结束 {end}（共 {total} 个单元）")]
    InvalidRange {
        start: usize,
        end: usize,
        total: usize,
    },

    #[error("无效的文档名称: {0}")]
    InvalidName(String),

    #[error("无效的内容单元: {0}")]
    InvalidUnit(String),
}
