//! 段落分块器
//!
//! 按段落（换行）把修正后的页面文本切成大小受限的内容单元，
//! 从不在段落中间切分。

use super::document::{ContentUnit, DocumentError};

/// 默认目标单元大小（字符数）
pub const DEFAULT_TARGET_SIZE: usize = 2000;

/// 分块配置
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 目标单元大小（按 Unicode 字符计，含段落间换行）
    pub target_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
        }
    }
}

/// 把文本切分为内容单元
///
/// 规则:
/// 1. 按 `\n` 拆成段落，贪心累积
/// 2. 单元大小从第一个非空段落算起；位于单元首尾的空行不计入大小
/// 3. 追加下一个非空段落会超过 target_size 且缓冲区已有内容时，先关闭当前单元，
///    缓冲区尾部的空行随当前单元一起关闭
/// 4. 单段超长时独占一个单元，不再切分
///
/// 用 `\n` 连接所有单元即可还原原文。空白文本返回空列表。
pub fn split_into_units(text: &str, target_size: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut units: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    // 从第一个非空段落到缓冲区末尾的字符数
    let mut content_chars = 0;
    let mut buffer_has_content = false;

    for paragraph in text.split('\n') {
        let paragraph_chars = paragraph.chars().count();

        if paragraph.trim().is_empty() {
            if buffer_has_content {
                content_chars += 1 + paragraph_chars;
            }
            buffer.push(paragraph);
            continue;
        }

        if buffer_has_content && content_chars + 1 + paragraph_chars > target_size {
            units.push(buffer.join("\n"));
            buffer.clear();
            content_chars = paragraph_chars;
        } else if buffer_has_content {
            content_chars += 1 + paragraph_chars;
        } else {
            content_chars = paragraph_chars;
        }

        buffer.push(paragraph);
        buffer_has_content = true;
    }

    // 开头已排除全空白文本，缓冲区必有内容
    units.push(buffer.join("\n"));
    units
}

/// 使用配置分块（便捷方法）
pub fn split_with_config(text: &str, config: &ChunkConfig) -> Vec<String> {
    split_into_units(text, config.target_size)
}

/// 对整份文档的修正页面分块，按页序分配 global_index（从 1 开始）
///
/// `corrected_pages[i]` 对应第 i + 1 页
pub fn chunk_document(
    corrected_pages: &[String],
    config: &ChunkConfig,
) -> Result<Vec<ContentUnit>, DocumentError> {
    let mut units = Vec::new();

    for (page_offset, text) in corrected_pages.iter().enumerate() {
        let page_index = page_offset + 1;
        for (position, content) in split_with_config(text, config).into_iter().enumerate() {
            units.push(ContentUnit::new(units.len() + 1, page_index, position + 1, content)?);
        }
    }

    Ok(units)
}
