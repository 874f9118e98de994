//! Library Handlers - 多文档提取
//!
//! 依次处理多个文档；单个文档失败只记录，不影响后续文档

use std::sync::Arc;

use crate::application::commands::RunLibraryExtraction;
use crate::application::error::ApplicationError;
use crate::application::ports::UnitStorePort;
use crate::domain::document::DocumentName;

use super::extract_handlers::{RunExtractionHandler, RunSummary};

/// 单个文档的处理结果
#[derive(Debug)]
pub struct DocumentOutcome {
    pub document: DocumentName,
    pub result: Result<RunSummary, ApplicationError>,
}

/// 多文档运行报告
#[derive(Debug, Default)]
pub struct LibraryReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl LibraryReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// RunLibraryExtraction Handler
pub struct RunLibraryHandler {
    store: Arc<dyn UnitStorePort>,
    driver: Arc<RunExtractionHandler>,
}

impl RunLibraryHandler {
    pub fn new(store: Arc<dyn UnitStorePort>, driver: Arc<RunExtractionHandler>) -> Self {
        Self { store, driver }
    }

    pub async fn handle(
        &self,
        command: RunLibraryExtraction,
    ) -> Result<LibraryReport, ApplicationError> {
        let documents = if command.documents.is_empty() {
            self.store.list_documents().await?
        } else {
            command.documents.clone()
        };

        tracing::info!(documents = documents.len(), "Library extraction started");

        let mut report = LibraryReport::default();
        for document in documents {
            let result = self.driver.handle(command.for_document(document.clone())).await;
            if let Err(e) = &result {
                tracing::error!(document = %document, error = %e, "Document extraction failed");
            }
            report.outcomes.push(DocumentOutcome { document, result });
        }

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Library extraction finished"
        );

        Ok(report)
    }
}
