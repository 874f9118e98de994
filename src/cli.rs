//! 命令行参数
//!
//! 命令行参数覆盖配置文件与环境变量

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, OutputMode};
use crate::domain::document::DocumentFormat;

/// 分页文档文学句子提取工具
///
/// 将文档切分为内容单元，逐单元调用大模型提取文学性句子，
/// 并按页码顺序汇总输出。
#[derive(Parser, Debug)]
#[command(name = "jinju", version, about = "Literary sentence extraction for paged documents")]
pub struct CliArgs {
    /// 配置文件路径（默认搜索 jinju.toml / jinju.local.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 内容单元目录
    #[arg(long, global = true)]
    pub units_dir: Option<PathBuf>,

    /// 输出目录
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 读取文档，修复跨页句子并切分为内容单元
    Ingest(IngestArgs),

    /// 对已导入的文档提取文学句子
    Extract(ExtractArgs),

    /// 导入后立即提取
    Run {
        #[command(flatten)]
        ingest: IngestArgs,

        #[command(flatten)]
        options: ExtractOptions,
    },

    /// 列出已导入的文档
    List,

    /// 检查提取服务是否可用
    Check {
        /// 服务商: openai, deepseek, qianwen, ernie, fake
        #[arg(long)]
        provider: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// 文档文件（分页文本以换页符分隔，分章文本以章节标题分隔）
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// 文档格式: paged (pdf) 或 chaptered (epub)，缺省时自动判断
    #[arg(long, value_parser = parse_format)]
    pub format: Option<DocumentFormat>,

    /// 单元目标字符数
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// 要处理的文档名称（可重复），缺省时处理全部已导入文档
    #[arg(long = "document")]
    pub documents: Vec<String>,

    #[command(flatten)]
    pub options: ExtractOptions,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractOptions {
    /// 起始单元（1-based，含）
    #[arg(long)]
    pub start: Option<usize>,

    /// 结束单元（1-based，含）
    #[arg(long)]
    pub end: Option<usize>,

    /// 存储模式
    #[arg(long, value_enum)]
    pub mode: Option<OutputMode>,

    /// 批量模式下每处理多少个单元刷新一次
    #[arg(long)]
    pub dump_interval: Option<usize>,

    /// 自定义提取指令，覆盖默认系统提示词
    #[arg(long)]
    pub instruction: Option<String>,

    /// 服务商: openai, deepseek, qianwen, ernie, fake
    #[arg(long)]
    pub provider: Option<String>,

    /// 每次调用之后的等待时间（毫秒）
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

fn parse_format(s: &str) -> Result<DocumentFormat, String> {
    DocumentFormat::from_str(s).ok_or_else(|| format!("unknown format: {} (paged|chaptered)", s))
}

impl CliArgs {
    /// 把命令行参数合并进配置
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.units_dir {
            config.storage.units_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.storage.output_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }

        match &self.command {
            Command::Ingest(ingest) => ingest.apply(config),
            Command::Extract(extract) => extract.options.apply(config),
            Command::Run { ingest, options } => {
                ingest.apply(config);
                options.apply(config);
            }
            Command::Check {
                provider: Some(provider),
            } => config.extractor.provider = provider.clone(),
            Command::List | Command::Check { provider: None } => {}
        }
    }
}

impl IngestArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(size) = self.chunk_size {
            config.chunk.target_size = size;
        }
    }
}

impl ExtractOptions {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.run.storage_mode = mode;
        }
        if let Some(interval) = self.dump_interval {
            config.run.dump_interval = interval;
        }
        if let Some(provider) = &self.provider {
            config.extractor.provider = provider.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.run.call_delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_flags_override_config() {
        let args = CliArgs::parse_from([
            "jinju",
            "--output-dir",
            "out",
            "extract",
            "--document",
            "边城",
            "--start",
            "3",
            "--mode",
            "batch",
            "--dump-interval",
            "4",
            "--provider",
            "fake",
            "--delay-ms",
            "0",
        ]);

        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.storage.output_dir, PathBuf::from("out"));
        assert_eq!(config.run.storage_mode, OutputMode::Batch);
        assert_eq!(config.run.dump_interval, 4);
        assert_eq!(config.extractor.provider, "fake");
        assert_eq!(config.run.call_delay_ms, 0);

        match args.command {
            Command::Extract(extract) => {
                assert_eq!(extract.documents, vec!["边城".to_string()]);
                assert_eq!(extract.options.start, Some(3));
                assert_eq!(extract.options.end, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_accepts_files_and_extract_options() {
        let args = CliArgs::parse_from([
            "jinju", "run", "a.txt", "b.txt", "--format", "epub", "--chunk-size", "800", "--end",
            "10",
        ]);

        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.chunk.target_size, 800);

        match args.command {
            Command::Run { ingest, options } => {
                assert_eq!(ingest.files.len(), 2);
                assert_eq!(ingest.format, Some(DocumentFormat::Chaptered));
                assert_eq!(options.end, Some(10));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ingest_requires_files() {
        assert!(CliArgs::try_parse_from(["jinju", "ingest"]).is_err());
    }
}
