//! Document Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::DocumentError;

/// 文档名称（取自源文件名，不含扩展名）
///
/// 同时用作单元目录和输出目录名，因此不允许路径分隔符
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentName(String);

impl DocumentName {
    pub fn new(name: impl Into<String>) -> Result<Self, DocumentError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DocumentError::InvalidName("文档名称不能为空".to_string()));
        }
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(DocumentError::InvalidName(format!(
                "文档名称包含非法字符: {}",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 从文件路径推导文档名称
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                DocumentError::InvalidName(format!("无法从路径获取文件名: {}", path.display()))
            })?;
        Self::new(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// 分页文档（PDF 导出的文本，换页符分隔）
    Paged,
    /// 分章文档（EPUB 导出的文本，章节标题分隔）
    Chaptered,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Paged => "paged",
            DocumentFormat::Chaptered => "chaptered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "paged" | "pdf" => Some(DocumentFormat::Paged),
            "chaptered" | "epub" => Some(DocumentFormat::Chaptered),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 处理范围 - 1-based、闭区间
///
/// 不变量: 1 <= start <= end <= total_units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingRange {
    start: usize,
    end: usize,
}

impl ProcessingRange {
    /// 按实际单元总数解析请求范围
    ///
    /// - start 缺省为 1，end 缺省为 total_units
    /// - 两端都被夹到 [1, total_units]
    /// - 夹紧后 start > end（或文档为空）时返回 InvalidRange
    pub fn resolve(
        requested_start: Option<usize>,
        requested_end: Option<usize>,
        total_units: usize,
    ) -> Result<Self, DocumentError> {
        if total_units == 0 {
            return Err(DocumentError::InvalidRange {
                start: requested_start.unwrap_or(1),
                end: requested_end.unwrap_or(0),
                total: 0,
            });
        }

        let start = requested_start.unwrap_or(1).clamp(1, total_units);
        let end = requested_end.unwrap_or(total_units).clamp(1, total_units);

        if start > end {
            return Err(DocumentError::InvalidRange {
                start,
                end,
                total: total_units,
            });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// 输出文件名中的范围后缀，如 `_pages_1-10`
    pub fn suffix(&self) -> String {
        format!("_pages_{}-{}", self.start, self.end)
    }
}

impl std::fmt::Display for ProcessingRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_clamps_both_ends() {
        let range = ProcessingRange::resolve(Some(0), Some(1000), 10).unwrap();
        assert_eq!((range.start(), range.end()), (1, 10));
    }

    #[test]
    fn test_resolve_rejects_inverted_range() {
        let err = ProcessingRange::resolve(Some(3), Some(2), 10).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidRange { start: 3, end: 2, total: 10 }
        ));
    }

    #[test]
    fn test_resolve_defaults() {
        let range = ProcessingRange::resolve(None, None, 7).unwrap();
        assert_eq!((range.start(), range.end()), (1, 7));
        assert_eq!(range.len(), 7);
    }

    #[test]
    fn test_resolve_start_beyond_total_clamps_to_last() {
        let range = ProcessingRange::resolve(Some(50), None, 7).unwrap();
        assert_eq!((range.start(), range.end()), (7, 7));
    }

    #[test]
    fn test_resolve_empty_document() {
        assert!(ProcessingRange::resolve(None, None, 0).is_err());
    }

    #[test]
    fn test_range_suffix() {
        let range = ProcessingRange::resolve(Some(2), Some(5), 9).unwrap();
        assert_eq!(range.suffix(), "_pages_2-5");
        assert!(range.contains(2) && range.contains(5) && !range.contains(6));
    }

    #[test]
    fn test_document_name_validation() {
        assert!(DocumentName::new("").is_err());
        assert!(DocumentName::new("a/b").is_err());
        assert_eq!(DocumentName::new(" 围城 ").unwrap().as_str(), "围城");
        let name = DocumentName::from_path(Path::new("/books/边城.txt")).unwrap();
        assert_eq!(name.as_str(), "边城");
    }

    #[test]
    fn test_document_format_parse() {
        assert_eq!(DocumentFormat::from_str("PDF"), Some(DocumentFormat::Paged));
        assert_eq!(DocumentFormat::from_str("chaptered"), Some(DocumentFormat::Chaptered));
        assert_eq!(DocumentFormat::from_str("doc"), None);
    }
}
