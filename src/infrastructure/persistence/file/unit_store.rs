//! File Unit Store - 文件系统单元库
//!
//! 实现 UnitStorePort trait
//!
//! 目录布局:
//! ```text
//! {base_dir}/{document}/unit_000001.json
//! {base_dir}/{document}/unit_000002.json
//! {base_dir}/{document}/document.json
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{StoreError, UnitStorePort};
use crate::domain::document::{ContentUnit, DocumentName, DocumentSummary};

use super::write_atomic;

const UNIT_PREFIX: &str = "unit_";
const UNIT_SUFFIX: &str = ".json";
const SUMMARY_FILE: &str = "document.json";

/// 文件系统单元库
pub struct FileUnitStore {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileUnitStore {
    /// 创建新的单元库
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    fn document_dir(&self, document: &DocumentName) -> PathBuf {
        self.base_dir.join(document.as_str())
    }

    /// 单元文件名使用定宽编号，字典序与数值序一致
    fn unit_path(&self, document: &DocumentName, global_index: usize) -> PathBuf {
        self.document_dir(document)
            .join(format!("{}{:06}{}", UNIT_PREFIX, global_index, UNIT_SUFFIX))
    }

    fn summary_path(&self, document: &DocumentName) -> PathBuf {
        self.document_dir(document).join(SUMMARY_FILE)
    }

    /// 列出目录中的单元编号（升序）
    async fn unit_indices(&self, document: &DocumentName) -> Result<Vec<usize>, StoreError> {
        let dir = self.document_dir(document);
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let mut indices = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            let name = entry.file_name();
            if let Some(index) = parse_unit_file_name(&name.to_string_lossy()) {
                indices.push(index);
            }
        }

        indices.sort_unstable();
        Ok(indices)
    }
}

fn parse_unit_file_name(name: &str) -> Option<usize> {
    name.strip_prefix(UNIT_PREFIX)?
        .strip_suffix(UNIT_SUFFIX)?
        .parse()
        .ok()
}

#[async_trait]
impl UnitStorePort for FileUnitStore {
    async fn reset_document(&self, document: &DocumentName) -> Result<(), StoreError> {
        let dir = self.document_dir(document);
        if fs::try_exists(&dir).await.unwrap_or(false) {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            tracing::debug!(document = %document, "Removed existing units");
        }
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn create_unit(
        &self,
        document: &DocumentName,
        unit: &ContentUnit,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(self.document_dir(document))
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let json = serde_json::to_vec_pretty(unit)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        let path = self.unit_path(document, unit.global_index());
        write_atomic(&path, &json)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        tracing::trace!(
            document = %document,
            unit = unit.global_index(),
            page = unit.page_index(),
            "Unit written"
        );

        Ok(())
    }

    async fn read_unit(
        &self,
        document: &DocumentName,
        global_index: usize,
    ) -> Result<Option<ContentUnit>, StoreError> {
        let path = self.unit_path(document, global_index);
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::IoError(e.to_string())),
        };

        let unit = serde_json::from_slice(&data)
            .map_err(|e| StoreError::SerializationError(format!("{}: {}", path.display(), e)))?;
        Ok(Some(unit))
    }

    async fn list_units(&self, document: &DocumentName) -> Result<Vec<ContentUnit>, StoreError> {
        let mut units = Vec::new();
        for index in self.unit_indices(document).await? {
            if let Some(unit) = self.read_unit(document, index).await? {
                units.push(unit);
            }
        }
        Ok(units)
    }

    async fn unit_count(&self, document: &DocumentName) -> Result<usize, StoreError> {
        Ok(self.unit_indices(document).await?.len())
    }

    async fn save_summary(&self, summary: &DocumentSummary) -> Result<(), StoreError> {
        fs::create_dir_all(self.document_dir(&summary.document_name))
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let json = serde_json::to_vec_pretty(summary)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        write_atomic(&self.summary_path(&summary.document_name), &json)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn load_summary(
        &self,
        document: &DocumentName,
    ) -> Result<Option<DocumentSummary>, StoreError> {
        let data = match fs::read(self.summary_path(document)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::IoError(e.to_string())),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentName>, StoreError> {
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let mut documents = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Ok(name) = DocumentName::new(entry.file_name().to_string_lossy()) {
                documents.push(name);
            }
        }

        documents.sort();
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::DocumentFormat;
    use tempfile::tempdir;

    fn unit(global: usize, page: usize, content: &str) -> ContentUnit {
        ContentUnit::new(global, page, 1, content.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_read_unit() {
        let temp_dir = tempdir().unwrap();
        let store = FileUnitStore::new(temp_dir.path()).await.unwrap();
        let doc = DocumentName::new("围城").unwrap();

        store.create_unit(&doc, &unit(1, 1, "婚姻是一座围城。")).await.unwrap();

        let read = store.read_unit(&doc, 1).await.unwrap().unwrap();
        assert_eq!(read.content(), "婚姻是一座围城。");
        assert!(temp_dir.path().join("围城").join("unit_000001.json").exists());
        assert!(store.read_unit(&doc, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_units_in_numeric_order() {
        let temp_dir = tempdir().unwrap();
        let store = FileUnitStore::new(temp_dir.path()).await.unwrap();
        let doc = DocumentName::new("书").unwrap();

        for i in [10, 2, 1, 100] {
            store.create_unit(&doc, &unit(i, 1, &format!("第{}块", i))).await.unwrap();
        }

        let indices: Vec<usize> = store
            .list_units(&doc)
            .await
            .unwrap()
            .iter()
            .map(|u| u.global_index())
            .collect();
        assert_eq!(indices, vec![1, 2, 10, 100]);
        assert_eq!(store.unit_count(&doc).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_reset_document_removes_units() {
        let temp_dir = tempdir().unwrap();
        let store = FileUnitStore::new(temp_dir.path()).await.unwrap();
        let doc = DocumentName::new("书").unwrap();

        store.create_unit(&doc, &unit(1, 1, "旧内容")).await.unwrap();
        store.reset_document(&doc).await.unwrap();

        assert_eq!(store.unit_count(&doc).await.unwrap(), 0);
        assert_eq!(store.list_documents().await.unwrap(), vec![doc]);
    }

    #[tokio::test]
    async fn test_summary_roundtrip_and_listing() {
        let temp_dir = tempdir().unwrap();
        let store = FileUnitStore::new(temp_dir.path()).await.unwrap();
        let a = DocumentName::new("乙").unwrap();
        let b = DocumentName::new("甲").unwrap();

        let units = vec![unit(1, 1, "一"), unit(2, 3, "三")];
        for u in &units {
            store.create_unit(&a, u).await.unwrap();
        }
        store.create_unit(&b, &unit(1, 1, "甲")).await.unwrap();

        let summary = DocumentSummary::from_units(a.clone(), DocumentFormat::Paged, 3, &units);
        store.save_summary(&summary).await.unwrap();

        let loaded = store.load_summary(&a).await.unwrap().unwrap();
        assert_eq!(loaded.total_units, 2);
        assert_eq!(loaded.pages[1].unit_count, 0);
        assert!(store.load_summary(&b).await.unwrap().is_none());

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(store.list_documents().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_missing_document_counts_zero() {
        let temp_dir = tempdir().unwrap();
        let store = FileUnitStore::new(temp_dir.path()).await.unwrap();
        let doc = DocumentName::new("无").unwrap();
        assert_eq!(store.unit_count(&doc).await.unwrap(), 0);
        assert!(store.list_units(&doc).await.unwrap().is_empty());
    }
}
