//! 批量模式断点
//!
//! 每次刷新后写入，记录已刷新到的单元和临时文件清单

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::application::ports::SinkError;
use crate::infrastructure::persistence::write_atomic;

/// 临时文件中的一个分节：单元索引与渲染后的字节长度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub unit_index: usize,
    pub len: usize,
}

/// 一个已刷新的临时文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub sequence: u32,
    /// 临时文件名（相对于输出目录）
    pub file_name: String,
    pub first_unit: usize,
    pub last_unit: usize,
    /// 按写入顺序排列的分节边界
    pub sections: Vec<SectionSpan>,
}

impl BatchRecord {
    /// 按记录的分节边界切分临时文件内容，不重新解析标题行
    pub fn split_sections<'a>(
        &self,
        content: &'a str,
    ) -> Result<Vec<(usize, &'a str)>, SinkError> {
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut offset = 0;

        for span in &self.sections {
            let raw = content.get(offset..offset + span.len).ok_or_else(|| {
                SinkError::Corrupted(format!(
                    "{}: section {} out of bounds",
                    self.file_name, span.unit_index
                ))
            })?;
            sections.push((span.unit_index, raw));
            offset += span.len;
        }

        if offset != content.len() {
            return Err(SinkError::Corrupted(format!(
                "{}: {} bytes not covered by recorded sections",
                self.file_name,
                content.len() - offset
            )));
        }

        Ok(sections)
    }
}

/// 断点记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCheckpoint {
    pub document: String,
    pub start: usize,
    pub end: usize,
    /// 已刷新的最后一个单元（含空结果单元）
    pub last_unit: usize,
    /// 最近一次使用的批次序号
    pub sequence: u32,
    pub batches: Vec<BatchRecord>,
    pub updated_at: DateTime<Utc>,
}

impl BatchCheckpoint {
    pub fn new(document: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            document: document.into(),
            start,
            end,
            last_unit: start.saturating_sub(1),
            sequence: 0,
            batches: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// 是否属于同一文档、同一范围的运行
    pub fn matches(&self, document: &str, start: usize, end: usize) -> bool {
        self.document == document && self.start == start && self.end == end
    }

    /// 各批次是否按单元顺序排列、互不重叠
    pub fn batches_ordered(&self) -> bool {
        self.batches
            .windows(2)
            .all(|pair| pair[0].sequence < pair[1].sequence && pair[0].last_unit < pair[1].first_unit)
    }

    pub async fn load(path: &Path) -> Result<Option<Self>, SinkError> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| SinkError::Corrupted(format!("{}: {}", path.display(), e)))
    }

    pub async fn save(&mut self, path: &Path) -> Result<(), SinkError> {
        self.updated_at = Utc::now();
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| SinkError::Corrupted(e.to_string()))?;
        write_atomic(path, &json).await?;
        Ok(())
    }
}
