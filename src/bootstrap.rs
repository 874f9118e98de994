//! 组装 - 按配置创建适配器与处理器

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{SentenceExtractorPort, UnitStorePort};
use crate::application::{
    ApplicationError, DriverConfig, IngestDocumentHandler, IngestReport, LibraryReport,
    RunExtractionHandler, RunLibraryExtraction, RunLibraryHandler,
};
use crate::config::{AppConfig, OutputMode};
use crate::domain::document::{DocumentFormat, DocumentName, DocumentSummary};
use crate::infrastructure::{
    create_extractor, FileUnitStore, OutputAggregatorFactory, StorageMode, TextDocumentReader,
};

/// 已导入文档的概况
#[derive(Debug, Clone)]
pub struct DocumentListing {
    pub name: DocumentName,
    pub unit_count: usize,
    pub summary: Option<DocumentSummary>,
}

/// 流水线：持有单元库，按需创建提取器
pub struct Pipeline {
    config: AppConfig,
    store: Arc<dyn UnitStorePort>,
}

impl Pipeline {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = FileUnitStore::new(&config.storage.units_dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open unit store: {}", e))?;

        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn storage_mode(&self) -> StorageMode {
        match self.config.run.storage_mode {
            OutputMode::Append => StorageMode::Append,
            OutputMode::Batch => StorageMode::Batch {
                dump_interval: self.config.run.dump_interval,
            },
        }
    }

    /// 依次导入文件；单个文件失败不影响其他文件
    pub async fn ingest(
        &self,
        files: &[PathBuf],
        format: Option<DocumentFormat>,
    ) -> Vec<(PathBuf, Result<IngestReport, ApplicationError>)> {
        let handler = IngestDocumentHandler::new(
            self.store.clone(),
            self.config.chunk.chunk_config(),
            self.config.reconcile.terminal_marks(),
        );

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            let result = self.ingest_one(&handler, file, format).await;
            if let Err(e) = &result {
                tracing::error!(file = %file.display(), error = %e, "Ingest failed");
            }
            reports.push((file.clone(), result));
        }
        reports
    }

    async fn ingest_one(
        &self,
        handler: &IngestDocumentHandler,
        file: &Path,
        format: Option<DocumentFormat>,
    ) -> Result<IngestReport, ApplicationError> {
        let reader = TextDocumentReader::open(file, format).await?;
        handler.handle(&reader).await
    }

    pub fn extractor(&self) -> anyhow::Result<Arc<dyn SentenceExtractorPort>> {
        create_extractor(&self.config.extractor)
            .map_err(|e| anyhow::anyhow!("Failed to create extractor: {}", e))
    }

    /// 对多个文档执行提取
    pub async fn extract(&self, command: RunLibraryExtraction) -> anyhow::Result<LibraryReport> {
        let extractor = self.extractor()?;
        let sinks = Arc::new(OutputAggregatorFactory::new(
            &self.config.storage.output_dir,
            self.storage_mode(),
        ));
        let driver = Arc::new(RunExtractionHandler::new(
            self.store.clone(),
            extractor,
            sinks,
            DriverConfig {
                call_delay: Duration::from_millis(self.config.run.call_delay_ms),
            },
        ));

        let report = RunLibraryHandler::new(self.store.clone(), driver)
            .handle(command)
            .await?;
        Ok(report)
    }

    pub async fn list(&self) -> Result<Vec<DocumentListing>, ApplicationError> {
        let mut listings = Vec::new();
        for name in self.store.list_documents().await? {
            let unit_count = self.store.unit_count(&name).await?;
            let summary = self.store.load_summary(&name).await?;
            listings.push(DocumentListing {
                name,
                unit_count,
                summary,
            });
        }
        Ok(listings)
    }

    pub async fn check(&self) -> anyhow::Result<bool> {
        let extractor = self.extractor()?;
        let healthy = extractor.health_check().await;
        tracing::info!(provider = extractor.provider_name(), healthy, "Health check");
        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs;

    fn test_config(root: &Path, mode: OutputMode) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.units_dir = root.join("units");
        config.storage.output_dir = root.join("output");
        config.extractor.provider = "fake".to_string();
        config.run.call_delay_ms = 0;
        config.run.storage_mode = mode;
        config.run.dump_interval = 2;
        config.chunk.target_size = 20;
        config
    }

    async fn write_book(root: &Path) -> PathBuf {
        let path = root.join("荷塘.txt");
        let text = "这几天心里颇不宁静。今晚在院子里坐着\x0C乘凉，忽然想起日日走过的荷塘。\n\
                    月亮渐渐地升高了，墙外马路上孩子们的欢笑已经听不见了。\x0C\x0C\
                    曲曲折折的荷塘上面，弥望的是田田的叶子。";
        fs::write(&path, text).await.unwrap();
        path
    }

    async fn run_pipeline(mode: OutputMode) -> String {
        let temp_dir = tempdir().unwrap();
        let book = write_book(temp_dir.path()).await;
        let pipeline = Pipeline::new(test_config(temp_dir.path(), mode)).await.unwrap();

        let reports = pipeline.ingest(&[book], None).await;
        let report = reports[0].1.as_ref().unwrap();
        assert_eq!(report.total_pages, 4);

        let library = pipeline.extract(RunLibraryExtraction::default()).await.unwrap();
        assert_eq!(library.succeeded(), 1);
        let summary = library.outcomes[0].result.as_ref().unwrap();
        let path = summary.output_path.clone().unwrap();

        fs::read_to_string(path).await.unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_both_modes_agree() {
        let append = run_pipeline(OutputMode::Append).await;
        let batch = run_pipeline(OutputMode::Batch).await;

        assert_eq!(append, batch);
        // 跨页句子被修复后完整出现
        assert!(append.contains("今晚在院子里坐着乘凉，忽然想起日日走过的荷塘。"));
        assert!(append.starts_with("=== 第1页 ===\n"));
    }

    #[tokio::test]
    async fn test_list_reports_ingested_documents() {
        let temp_dir = tempdir().unwrap();
        let book = write_book(temp_dir.path()).await;
        let pipeline = Pipeline::new(test_config(temp_dir.path(), OutputMode::Append))
            .await
            .unwrap();

        pipeline.ingest(&[book, temp_dir.path().join("缺失.txt")], None).await;

        let listings = pipeline.list().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name.as_str(), "荷塘");
        assert!(listings[0].unit_count > 0);
        assert_eq!(listings[0].summary.as_ref().unwrap().total_pages, 4);
    }

    #[tokio::test]
    async fn test_missing_file_reported_per_file() {
        let temp_dir = tempdir().unwrap();
        let pipeline = Pipeline::new(test_config(temp_dir.path(), OutputMode::Append))
            .await
            .unwrap();

        let reports = pipeline.ingest(&[temp_dir.path().join("缺失.txt")], None).await;
        assert!(matches!(reports[0].1, Err(ApplicationError::ReadError(_))));
    }
}
