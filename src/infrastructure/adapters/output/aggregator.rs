//! Output Aggregator - 提取结果汇总
//!
//! 实现 ResultSinkPort trait
//!
//! - 追加模式：每个非空结果立即追加到最终文件
//! - 批量模式：结果先在内存中累积，每 dump_interval 个单元刷新到一个临时文件，
//!   结束时按批次序号合并为最终文件
//!
//! 文件布局（均位于 `{output_dir}/{document}/` 下）:
//! ```text
//! {document}_pages_{s}-{e}_literary.txt       最终文件
//! {document}_pages_{s}-{e}_batch_{seq:03}.tmp  批量模式临时文件
//! {document}_pages_{s}-{e}.checkpoint.json     批量模式断点
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{ResultSinkFactoryPort, ResultSinkPort, SinkError};
use crate::domain::document::{DocumentName, ExtractionResult, ProcessingRange};
use crate::infrastructure::persistence::write_atomic;

use super::checkpoint::{BatchCheckpoint, BatchRecord, SectionSpan};
use super::section::render_section;

/// 存储模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Append,
    Batch { dump_interval: usize },
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Append => f.write_str("append"),
            StorageMode::Batch { dump_interval } => write!(f, "batch({})", dump_interval),
        }
    }
}

/// 汇总器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Idle,
    Accumulating,
    Flushed,
    Finalized,
}

/// 待刷新的结果
#[derive(Debug, Default)]
pub struct OutputBatch {
    results: Vec<ExtractionResult>,
    /// 本批已处理的单元数（含空结果）
    processed: usize,
    /// 本批见到的最大单元索引
    last_unit: Option<usize>,
}

impl OutputBatch {
    fn push(&mut self, result: ExtractionResult) {
        self.processed += 1;
        self.last_unit = Some(self.last_unit.map_or(result.unit_index, |u| u.max(result.unit_index)));
        if !result.is_empty() {
            self.results.push(result);
        }
    }

    fn is_pending(&self) -> bool {
        self.processed > 0
    }

    /// 按单元索引排序后渲染，同时返回各分节的边界
    fn render(&mut self) -> (String, Vec<SectionSpan>) {
        self.results.sort_by_key(|r| r.unit_index);

        let mut content = String::new();
        let mut sections = Vec::with_capacity(self.results.len());
        for result in &self.results {
            let section = render_section(result);
            sections.push(SectionSpan {
                unit_index: result.unit_index,
                len: section.len(),
            });
            content.push_str(&section);
        }
        (content, sections)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 输出汇总器，每个文档每次运行一个实例
pub struct OutputAggregator {
    mode: StorageMode,
    state: AggregatorState,
    dir: PathBuf,
    /// `{document}_pages_{s}-{e}`
    stem: String,
    document: String,
    range: ProcessingRange,
    batch: OutputBatch,
    checkpoint: BatchCheckpoint,
    resume_point: Option<usize>,
}

impl OutputAggregator {
    /// 打开汇总器；批量模式下如有匹配的断点则从断点继续
    pub async fn open(
        output_dir: impl AsRef<Path>,
        document: &DocumentName,
        range: ProcessingRange,
        mode: StorageMode,
    ) -> Result<Self, SinkError> {
        if let StorageMode::Batch { dump_interval: 0 } = mode {
            return Err(SinkError::InvalidState(
                "dump_interval must be positive".to_string(),
            ));
        }

        let dir = output_dir.as_ref().join(document.as_str());
        fs::create_dir_all(&dir).await?;

        let mut aggregator = Self {
            mode,
            state: AggregatorState::Idle,
            dir,
            stem: format!("{}{}", document, range.suffix()),
            document: document.to_string(),
            range,
            batch: OutputBatch::default(),
            checkpoint: BatchCheckpoint::new(document.as_str(), range.start(), range.end()),
            resume_point: None,
        };

        match mode {
            StorageMode::Append => {
                if fs::try_exists(aggregator.final_path()).await.unwrap_or(false) {
                    tracing::warn!(
                        path = %aggregator.final_path().display(),
                        "Output exists, new results will be appended without deduplication"
                    );
                }
            }
            StorageMode::Batch { .. } => aggregator.restore_checkpoint().await?,
        }

        Ok(aggregator)
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    pub fn final_path(&self) -> PathBuf {
        self.dir.join(format!("{}_literary.txt", self.stem))
    }

    fn batch_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    fn batch_file_name(&self, sequence: u32) -> String {
        format!("{}_batch_{:03}.tmp", self.stem, sequence)
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.dir.join(format!("{}.checkpoint.json", self.stem))
    }

    /// 读取断点；断点失效时清理残留的临时文件并从头开始
    async fn restore_checkpoint(&mut self) -> Result<(), SinkError> {
        let loaded = match BatchCheckpoint::load(&self.checkpoint_path()).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(document = %self.document, error = %e, "Discarding unreadable checkpoint");
                None
            }
        };

        if let Some(checkpoint) = loaded {
            let mut usable = checkpoint.matches(&self.document, self.range.start(), self.range.end());
            for batch in &checkpoint.batches {
                if !fs::try_exists(self.batch_path(&batch.file_name)).await.unwrap_or(false) {
                    usable = false;
                }
            }

            if usable {
                tracing::info!(
                    document = %self.document,
                    last_unit = checkpoint.last_unit,
                    batches = checkpoint.batches.len(),
                    "Resuming from checkpoint"
                );
                self.resume_point = Some(checkpoint.last_unit + 1);
                self.checkpoint = checkpoint;
                self.state = AggregatorState::Flushed;
                return Ok(());
            }

            tracing::warn!(document = %self.document, "Checkpoint does not match this run, starting over");
        }

        self.remove_stale_batches().await
    }

    async fn remove_stale_batches(&self) -> Result<(), SinkError> {
        let prefix = format!("{}_batch_", self.stem);
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with(".tmp") {
                tracing::debug!(file = %name, "Removing stale batch file");
                fs::remove_file(entry.path()).await?;
            }
        }
        let checkpoint = self.checkpoint_path();
        if fs::try_exists(&checkpoint).await.unwrap_or(false) {
            fs::remove_file(&checkpoint).await?;
        }
        Ok(())
    }

    async fn append_result(&mut self, result: &ExtractionResult) -> Result<(), SinkError> {
        if result.is_empty() {
            return Ok(());
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.final_path())
            .await?;
        file.write_all(render_section(result).as_bytes()).await?;
        file.flush().await?;

        self.state = AggregatorState::Finalized;
        Ok(())
    }

    /// 把当前批次写入新的临时文件，并更新断点
    async fn flush(&mut self) -> Result<(), SinkError> {
        let Some(last_unit) = self.batch.last_unit else {
            return Ok(());
        };

        if !self.batch.results.is_empty() {
            let sequence = self.checkpoint.sequence + 1;
            let file_name = self.batch_file_name(sequence);
            let first_unit = self.batch.results.iter().map(|r| r.unit_index).min().unwrap_or(last_unit);
            let (content, sections) = self.batch.render();

            write_atomic(&self.batch_path(&file_name), content.as_bytes()).await?;

            tracing::debug!(
                document = %self.document,
                sequence,
                first_unit,
                last_unit,
                sections = self.batch.results.len(),
                "Batch flushed"
            );

            self.checkpoint.sequence = sequence;
            self.checkpoint.batches.push(BatchRecord {
                sequence,
                file_name,
                first_unit,
                last_unit,
                sections,
            });
        }

        self.checkpoint.last_unit = self.checkpoint.last_unit.max(last_unit);
        let checkpoint_path = self.checkpoint_path();
        self.checkpoint.save(&checkpoint_path).await?;

        self.batch.clear();
        self.state = AggregatorState::Flushed;
        Ok(())
    }

    /// 按序号合并临时文件；批次乱序或重叠时按单元索引重新排序
    async fn merge(&mut self) -> Result<Option<PathBuf>, SinkError> {
        let mut batches = self.checkpoint.batches.clone();
        batches.sort_by_key(|b| b.sequence);

        if batches.is_empty() {
            self.remove_stale_batches().await?;
            return Ok(None);
        }

        let mut contents = Vec::with_capacity(batches.len());
        for batch in &batches {
            contents.push(fs::read_to_string(self.batch_path(&batch.file_name)).await?);
        }

        let merged = if self.checkpoint.batches_ordered() {
            contents.concat()
        } else {
            tracing::warn!(document = %self.document, "Batches overlap, re-sorting sections");
            let mut sections = Vec::new();
            for (batch, content) in batches.iter().zip(&contents) {
                sections.extend(batch.split_sections(content)?);
            }
            sections.sort_by_key(|(unit_index, _)| *unit_index);
            sections.into_iter().map(|(_, raw)| raw).collect()
        };

        let final_path = self.final_path();
        write_atomic(&final_path, merged.as_bytes()).await?;

        for batch in &batches {
            fs::remove_file(self.batch_path(&batch.file_name)).await?;
        }
        let checkpoint = self.checkpoint_path();
        if fs::try_exists(&checkpoint).await.unwrap_or(false) {
            fs::remove_file(&checkpoint).await?;
        }

        tracing::info!(
            document = %self.document,
            batches = batches.len(),
            path = %final_path.display(),
            "Batches merged"
        );

        Ok(Some(final_path))
    }
}

#[async_trait]
impl ResultSinkPort for OutputAggregator {
    async fn accept(&mut self, result: ExtractionResult) -> Result<(), SinkError> {
        match self.mode {
            StorageMode::Append => self.append_result(&result).await,
            StorageMode::Batch { dump_interval } => {
                if self.state == AggregatorState::Finalized {
                    return Err(SinkError::InvalidState(format!(
                        "{} already finalized",
                        self.stem
                    )));
                }
                self.batch.push(result);
                self.state = AggregatorState::Accumulating;
                if self.batch.processed >= dump_interval {
                    self.flush().await?;
                }
                Ok(())
            }
        }
    }

    async fn finalize(&mut self) -> Result<Option<PathBuf>, SinkError> {
        let path = match self.mode {
            StorageMode::Append => {
                let path = self.final_path();
                fs::try_exists(&path).await.unwrap_or(false).then_some(path)
            }
            StorageMode::Batch { .. } => {
                if self.state == AggregatorState::Finalized {
                    let path = self.final_path();
                    return Ok(fs::try_exists(&path).await.unwrap_or(false).then_some(path));
                }
                if self.batch.is_pending() {
                    self.flush().await?;
                }
                self.merge().await?
            }
        };

        self.state = AggregatorState::Finalized;
        Ok(path)
    }

    fn resume_point(&self) -> Option<usize> {
        self.resume_point
    }
}

/// 为每个文档创建 OutputAggregator
pub struct OutputAggregatorFactory {
    output_dir: PathBuf,
    mode: StorageMode,
}

impl OutputAggregatorFactory {
    pub fn new(output_dir: impl Into<PathBuf>, mode: StorageMode) -> Self {
        Self {
            output_dir: output_dir.into(),
            mode,
        }
    }
}

#[async_trait]
impl ResultSinkFactoryPort for OutputAggregatorFactory {
    async fn open(
        &self,
        document: &DocumentName,
        range: &ProcessingRange,
    ) -> Result<Box<dyn ResultSinkPort>, SinkError> {
        let aggregator = OutputAggregator::open(&self.output_dir, document, *range, self.mode).await?;
        Ok(Box::new(aggregator))
    }
}
