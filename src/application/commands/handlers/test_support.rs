//! 处理器测试用的内存实现

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::ports::{
    DocumentReaderPort, ExtractionError, ReadError, ResultSinkFactoryPort, ResultSinkPort,
    SentenceExtractorPort, SinkError, StoreError, UnitStorePort,
};
use crate::domain::document::{
    ContentUnit, DocumentFormat, DocumentName, DocumentSummary, ExtractionResult,
    ProcessingRange,
};

/// 内存单元库
#[derive(Default)]
pub struct InMemoryUnitStore {
    units: Mutex<BTreeMap<DocumentName, BTreeMap<usize, ContentUnit>>>,
    summaries: Mutex<BTreeMap<DocumentName, DocumentSummary>>,
}

#[async_trait]
impl UnitStorePort for InMemoryUnitStore {
    async fn reset_document(&self, document: &DocumentName) -> Result<(), StoreError> {
        self.units.lock().unwrap().remove(document);
        self.summaries.lock().unwrap().remove(document);
        Ok(())
    }

    async fn create_unit(
        &self,
        document: &DocumentName,
        unit: &ContentUnit,
    ) -> Result<(), StoreError> {
        self.units
            .lock()
            .unwrap()
            .entry(document.clone())
            .or_default()
            .insert(unit.global_index(), unit.clone());
        Ok(())
    }

    async fn read_unit(
        &self,
        document: &DocumentName,
        global_index: usize,
    ) -> Result<Option<ContentUnit>, StoreError> {
        Ok(self
            .units
            .lock()
            .unwrap()
            .get(document)
            .and_then(|units| units.get(&global_index).cloned()))
    }

    async fn list_units(&self, document: &DocumentName) -> Result<Vec<ContentUnit>, StoreError> {
        Ok(self
            .units
            .lock()
            .unwrap()
            .get(document)
            .map(|units| units.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn unit_count(&self, document: &DocumentName) -> Result<usize, StoreError> {
        Ok(self
            .units
            .lock()
            .unwrap()
            .get(document)
            .map(|units| units.len())
            .unwrap_or(0))
    }

    async fn save_summary(&self, summary: &DocumentSummary) -> Result<(), StoreError> {
        self.summaries
            .lock()
            .unwrap()
            .insert(summary.document_name.clone(), summary.clone());
        Ok(())
    }

    async fn load_summary(
        &self,
        document: &DocumentName,
    ) -> Result<Option<DocumentSummary>, StoreError> {
        Ok(self.summaries.lock().unwrap().get(document).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentName>, StoreError> {
        Ok(self.units.lock().unwrap().keys().cloned().collect())
    }
}

/// 按给定索引写入单元，内容为 "单元{n}"
pub async fn seeded_store(document: &DocumentName, indices: &[usize]) -> Arc<InMemoryUnitStore> {
    let store = Arc::new(InMemoryUnitStore::default());
    for &index in indices {
        let unit = ContentUnit::new(index, 1, index, format!("单元{}", index)).unwrap();
        store.create_unit(document, &unit).await.unwrap();
    }
    store
}

/// 固定页面的读取器，None 表示该页读取失败
pub struct StaticReader {
    pub name: DocumentName,
    pages: Vec<Option<String>>,
}

impl StaticReader {
    pub fn new(name: &str, pages: &[Option<&str>]) -> Self {
        Self {
            name: DocumentName::new(name).unwrap(),
            pages: pages.iter().map(|p| p.map(str::to_string)).collect(),
        }
    }
}

#[async_trait]
impl DocumentReaderPort for StaticReader {
    fn document_name(&self) -> &DocumentName {
        &self.name
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Paged
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn read_page(&self, index: usize) -> Result<String, ReadError> {
        match self.pages.get(index.wrapping_sub(1)) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(ReadError::DecodeError {
                index,
                reason: "scripted failure".to_string(),
            }),
            None => Err(ReadError::PageOutOfRange {
                index,
                total: self.pages.len(),
            }),
        }
    }
}

/// 回显输入的提取器，可指定在哪些内容上失败
#[derive(Default)]
pub struct ScriptedExtractor {
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedExtractor {
    pub fn echo() -> Self {
        Self::default()
    }

    /// 对 "单元{n}" 返回服务错误
    pub fn failing_on(indices: &[usize]) -> Self {
        Self {
            failing: indices.iter().map(|i| format!("单元{}", i)).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn instructions(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, instruction)| instruction.clone())
            .collect()
    }
}

#[async_trait]
impl SentenceExtractorPort for ScriptedExtractor {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn extract(
        &self,
        text: &str,
        instruction: Option<&str>,
    ) -> Result<String, ExtractionError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), instruction.map(str::to_string)));

        if self.failing.contains(text) {
            return Err(ExtractionError::ServiceError {
                status: 500,
                body: "scripted".to_string(),
            });
        }
        Ok(format!("摘：{}", text))
    }
}

/// 记录收到的结果
#[derive(Default)]
pub struct RecordingSink {
    pub accepted: Vec<ExtractionResult>,
    pub finalized: bool,
    resume_at: Option<usize>,
    fail_on: Option<usize>,
    shared: Option<Arc<Mutex<SinkLog>>>,
}

#[derive(Default)]
pub struct SinkLog {
    accepted: Vec<usize>,
    finalized: bool,
}

impl RecordingSink {
    pub fn resuming_at(index: usize) -> Self {
        Self {
            resume_at: Some(index),
            ..Default::default()
        }
    }

    /// 在接收指定单元时返回 IO 错误
    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Default::default()
        }
    }

    pub fn accepted_indices(&self) -> Vec<usize> {
        self.accepted.iter().map(|r| r.unit_index).collect()
    }
}

#[async_trait]
impl ResultSinkPort for RecordingSink {
    async fn accept(&mut self, result: ExtractionResult) -> Result<(), SinkError> {
        if self.fail_on == Some(result.unit_index) {
            return Err(SinkError::IoError("disk full".to_string()));
        }
        if let Some(log) = &self.shared {
            log.lock().unwrap().accepted.push(result.unit_index);
        }
        self.accepted.push(result);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<Option<PathBuf>, SinkError> {
        self.finalized = true;
        if let Some(log) = &self.shared {
            log.lock().unwrap().finalized = true;
        }
        Ok(None)
    }

    fn resume_point(&self) -> Option<usize> {
        self.resume_at
    }
}

/// 产出 RecordingSink 的工厂，跨文档累计记录
#[derive(Default)]
pub struct RecordingSinkFactory {
    log: Arc<Mutex<SinkLog>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingSinkFactory {
    pub fn accepted_indices(&self) -> Vec<usize> {
        self.log.lock().unwrap().accepted.clone()
    }

    pub fn finalized(&self) -> bool {
        self.log.lock().unwrap().finalized
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSinkFactoryPort for RecordingSinkFactory {
    async fn open(
        &self,
        document: &DocumentName,
        _range: &ProcessingRange,
    ) -> Result<Box<dyn ResultSinkPort>, SinkError> {
        self.opened.lock().unwrap().push(document.to_string());
        Ok(Box::new(RecordingSink {
            shared: Some(self.log.clone()),
            ..Default::default()
        }))
    }
}
