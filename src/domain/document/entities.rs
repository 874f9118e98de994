//! Document Context - Entities

use serde::{Deserialize, Serialize};

use super::DocumentError;

/// 原始页面 - 文档读取器产出的一页（或一章）未处理文本
///
/// 不变量:
/// - index 从 1 开始，在文档内连续且唯一
/// - 创建后不可变，不直接持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    index: usize,
    text: String,
    source_document_name: String,
    total_units: usize,
}

impl RawPage {
    pub fn new(
        index: usize,
        text: impl Into<String>,
        source_document_name: impl Into<String>,
        total_units: usize,
    ) -> Self {
        Self {
            index,
            text: text.into(),
            source_document_name: source_document_name.into(),
            total_units,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_document_name(&self) -> &str {
        &self.source_document_name
    }

    pub fn total_units(&self) -> usize {
        self.total_units
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// 内容单元 - 一次提取调用所处理的最小文本块
///
/// 不变量:
/// - global_index 从 1 开始，在整个文档内严格递增
/// - within_page_index 从 1 开始，表示在同一页派生单元中的位置
/// - content 不可为空（也不能只有空白）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    global_index: usize,
    page_index: usize,
    within_page_index: usize,
    content: String,
}

impl ContentUnit {
    pub fn new(
        global_index: usize,
        page_index: usize,
        within_page_index: usize,
        content: String,
    ) -> Result<Self, DocumentError> {
        if global_index == 0 || within_page_index == 0 {
            return Err(DocumentError::InvalidUnit(
                "单元索引必须从 1 开始".to_string(),
            ));
        }
        if content.trim().is_empty() {
            return Err(DocumentError::InvalidUnit(format!(
                "单元 {} 内容不能为空",
                global_index
            )));
        }
        Ok(Self {
            global_index,
            page_index,
            within_page_index,
            content,
        })
    }

    pub fn global_index(&self) -> usize {
        self.global_index
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn within_page_index(&self) -> usize {
        self.within_page_index
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// 提取结果
///
/// extracted_text 为空表示"未发现文学性句子"，不是错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub unit_index: usize,
    pub extracted_text: String,
}

impl ExtractionResult {
    pub fn new(unit_index: usize, extracted_text: impl Into<String>) -> Self {
        Self {
            unit_index,
            extracted_text: extracted_text.into(),
        }
    }

    /// 去掉空白后是否为空
    pub fn is_empty(&self) -> bool {
        self.extracted_text.trim().is_empty()
    }
}
