//! Ingest Handlers - 文档导入
//!
//! 读取原始页面 → 跨页修复 → 段落分块 → 写入单元库

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{DocumentReaderPort, UnitStorePort};
use crate::domain::document::{DocumentName, DocumentSummary, RawPage};
use crate::domain::{chunk_document, reconcile_pages, ChunkConfig, TerminalMarks};

/// 导入结果
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document: DocumentName,
    pub total_pages: usize,
    pub total_units: usize,
    /// 读取失败、以空文本代替的页码
    pub unreadable_pages: Vec<usize>,
}

/// IngestDocument Handler
pub struct IngestDocumentHandler {
    store: Arc<dyn UnitStorePort>,
    chunk_config: ChunkConfig,
    terminal_marks: TerminalMarks,
}

impl IngestDocumentHandler {
    pub fn new(
        store: Arc<dyn UnitStorePort>,
        chunk_config: ChunkConfig,
        terminal_marks: TerminalMarks,
    ) -> Self {
        Self {
            store,
            chunk_config,
            terminal_marks,
        }
    }

    pub async fn handle(
        &self,
        reader: &dyn DocumentReaderPort,
    ) -> Result<IngestReport, ApplicationError> {
        if self.chunk_config.target_size == 0 {
            return Err(ApplicationError::validation("chunk target size must be positive"));
        }

        let document = reader.document_name().clone();
        let total_pages = reader.page_count();

        tracing::info!(
            document = %document,
            format = %reader.format(),
            total_pages,
            "Ingesting document"
        );

        let (raw_pages, unreadable_pages) = collect_raw_pages(reader).await;
        let corrected = reconcile_pages(&raw_pages, &self.terminal_marks);
        let units = chunk_document(&corrected, &self.chunk_config)?;

        self.store.reset_document(&document).await?;
        for unit in &units {
            self.store.create_unit(&document, unit).await?;
        }

        let summary =
            DocumentSummary::from_units(document.clone(), reader.format(), total_pages, &units);
        self.store.save_summary(&summary).await?;

        tracing::info!(
            document = %document,
            total_pages,
            total_units = units.len(),
            unreadable = unreadable_pages.len(),
            "Document ingested"
        );

        Ok(IngestReport {
            document,
            total_pages,
            total_units: units.len(),
            unreadable_pages,
        })
    }
}

/// 读取所有页面；单页失败时以空文本代替，页码保持完整
async fn collect_raw_pages(reader: &dyn DocumentReaderPort) -> (Vec<RawPage>, Vec<usize>) {
    let total = reader.page_count();
    let name = reader.document_name().as_str().to_string();
    let mut pages = Vec::with_capacity(total);
    let mut unreadable = Vec::new();

    for index in 1..=total {
        let text = match reader.read_page(index).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(document = %name, page = index, error = %e, "Page unreadable, using empty text");
                unreadable.push(index);
                String::new()
            }
        };
        pages.push(RawPage::new(index, text, name.clone(), total));
    }

    (pages, unreadable)
}
