//! Extraction Handlers - 提取驱动
//!
//! 按单元索引升序逐个调用提取服务，每次调用后固定延时（限流），
//! 结果按同一顺序交给 ResultSink。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::RunExtraction;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ResultSinkFactoryPort, ResultSinkPort, SentenceExtractorPort, UnitStorePort,
};
use crate::domain::document::{DocumentName, ExtractionResult, ProcessingRange};

/// 驱动配置
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// 每次提取调用之后的等待时间
    pub call_delay: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            call_delay: Duration::from_millis(1000),
        }
    }
}

/// 单个文档的运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub document: String,
    pub start: usize,
    pub end: usize,
    /// 断点续跑时实际开始的单元
    pub resumed_from: Option<usize>,
    /// 调用过提取服务的单元数
    pub processed: usize,
    /// 缺失而跳过的单元数
    pub skipped: usize,
    /// 提取服务报错的单元数（按空结果处理）
    pub failed: usize,
    /// 结果为空的单元数（含 failed）
    pub empty: usize,
    /// 写入输出的单元数
    pub emitted: usize,
    pub output_path: Option<PathBuf>,
}

/// RunExtraction Handler
pub struct RunExtractionHandler {
    store: Arc<dyn UnitStorePort>,
    extractor: Arc<dyn SentenceExtractorPort>,
    sinks: Arc<dyn ResultSinkFactoryPort>,
    config: DriverConfig,
}

impl RunExtractionHandler {
    pub fn new(
        store: Arc<dyn UnitStorePort>,
        extractor: Arc<dyn SentenceExtractorPort>,
        sinks: Arc<dyn ResultSinkFactoryPort>,
        config: DriverConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            sinks,
            config,
        }
    }

    /// 解析范围、打开 sink 并驱动整个范围
    pub async fn handle(&self, command: RunExtraction) -> Result<RunSummary, ApplicationError> {
        let document = command.document;
        let total_units = self.store.unit_count(&document).await?;

        let range = ProcessingRange::resolve(command.start, command.end, total_units)
            .map_err(|e| ApplicationError::invalid_range(document.as_str(), e))?;

        let mut sink = self.sinks.open(&document, &range).await?;

        self.drive(
            &document,
            range,
            command.instruction.as_deref(),
            sink.as_mut(),
        )
        .await
    }

    /// 驱动循环：严格串行，一次只有一个提取调用在进行
    pub async fn drive(
        &self,
        document: &DocumentName,
        range: ProcessingRange,
        instruction: Option<&str>,
        sink: &mut dyn ResultSinkPort,
    ) -> Result<RunSummary, ApplicationError> {
        let mut summary = RunSummary {
            document: document.to_string(),
            start: range.start(),
            end: range.end(),
            ..Default::default()
        };

        let first = match sink.resume_point() {
            Some(point) if point > range.start() => {
                summary.resumed_from = Some(point);
                point
            }
            _ => range.start(),
        };

        tracing::info!(
            document = %document,
            range = %range,
            resumed_from = ?summary.resumed_from,
            provider = self.extractor.provider_name(),
            "Extraction started"
        );

        for index in first..=range.end() {
            let unit = match self.store.read_unit(document, index).await {
                Ok(Some(unit)) => unit,
                Ok(None) => {
                    let err = ApplicationError::MissingUnit {
                        document: document.to_string(),
                        index,
                    };
                    tracing::warn!(error = %err, "Skipping unit");
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(document = %document, unit_index = index, error = %e, "Unit unreadable, skipping");
                    summary.skipped += 1;
                    continue;
                }
            };

            tracing::debug!(
                document = %document,
                unit_index = index,
                chars = unit.char_count(),
                "Extracting unit"
            );

            let text = match self.extractor.extract(unit.content(), instruction).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        document = %document,
                        unit_index = index,
                        error = %e,
                        "Extraction failed, treating as empty"
                    );
                    summary.failed += 1;
                    String::new()
                }
            };

            let result = ExtractionResult::new(index, text);
            summary.processed += 1;
            if result.is_empty() {
                summary.empty += 1;
            } else {
                summary.emitted += 1;
            }

            if let Err(e) = sink.accept(result).await {
                tracing::error!(document = %document, unit_index = index, error = %e, "Failed to write result");
                if let Err(finalize_err) = sink.finalize().await {
                    tracing::error!(document = %document, error = %finalize_err, "Failed to finalize after write error");
                }
                return Err(e.into());
            }

            if !self.config.call_delay.is_zero() {
                tokio::time::sleep(self.config.call_delay).await;
            }
        }

        summary.output_path = sink.finalize().await?;

        tracing::info!(
            document = %document,
            range = %range,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            empty = summary.empty,
            emitted = summary.emitted,
            output = ?summary.output_path,
            "Extraction finished"
        );

        Ok(summary)
    }
}
