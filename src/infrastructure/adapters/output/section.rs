//! 输出分节格式
//!
//! ```text
//! === 第{unit_index}页 ===
//! {extracted_text}
//!
//! ```

use crate::domain::document::ExtractionResult;

const HEADER_PREFIX: &str = "=== 第";
const HEADER_SUFFIX: &str = "页 ===";

/// 渲染一个单元的输出分节（两种存储模式完全一致）
pub fn render_section(result: &ExtractionResult) -> String {
    format!(
        "{}{}{}\n{}\n\n",
        HEADER_PREFIX,
        result.unit_index,
        HEADER_SUFFIX,
        result.extracted_text.trim_end()
    )
}
