//! Document Context - 文档摘要记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentUnit, DocumentFormat, DocumentName};

/// 单页切分出的单元数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUnitCount {
    pub page: usize,
    pub unit_count: usize,
}

/// 文档摘要 - 每个文档一份，供下游工具使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_name: DocumentName,
    pub format: DocumentFormat,
    pub total_pages: usize,
    pub total_units: usize,
    pub created_at: DateTime<Utc>,
    pub pages: Vec<PageUnitCount>,
}

impl DocumentSummary {
    /// 由已生成的单元构建摘要
    ///
    /// 没有产出单元的页面（空白页）也会记录，unit_count 为 0
    pub fn from_units(
        document_name: DocumentName,
        format: DocumentFormat,
        total_pages: usize,
        units: &[ContentUnit],
    ) -> Self {
        let mut pages: Vec<PageUnitCount> = (1..=total_pages)
            .map(|page| PageUnitCount {
                page,
                unit_count: 0,
            })
            .collect();

        for unit in units {
            if let Some(entry) = pages.get_mut(unit.page_index().saturating_sub(1)) {
                entry.unit_count += 1;
            }
        }

        Self {
            document_name,
            format,
            total_pages,
            total_units: units.len(),
            created_at: Utc::now(),
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_units_per_page() {
        let units = vec![
            ContentUnit::new(1, 1, 1, "a".to_string()).unwrap(),
            ContentUnit::new(2, 1, 2, "b".to_string()).unwrap(),
            ContentUnit::new(3, 3, 1, "c".to_string()).unwrap(),
        ];
        let summary = DocumentSummary::from_units(
            DocumentName::new("书").unwrap(),
            DocumentFormat::Paged,
            3,
            &units,
        );

        assert_eq!(summary.total_units, 3);
        let counts: Vec<usize> = summary.pages.iter().map(|p| p.unit_count).collect();
        assert_eq!(counts, vec![2, 0, 1]);
    }
}
