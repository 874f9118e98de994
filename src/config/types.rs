//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::{ChunkConfig, TerminalMarks, DEFAULT_TARGET_SIZE, DEFAULT_TERMINAL_MARKS};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存储目录配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 分块配置
    #[serde(default)]
    pub chunk: ChunkSettings,

    /// 跨页修复配置
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// 提取服务配置
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// 运行配置
    #[serde(default)]
    pub run: RunConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 内容单元目录
    #[serde(default = "default_units_dir")]
    pub units_dir: PathBuf,

    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_units_dir() -> PathBuf {
    PathBuf::from("sep_pages")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            units_dir: default_units_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// 分块配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkSettings {
    /// 单元目标字符数
    #[serde(default = "default_target_size")]
    pub target_size: usize,
}

fn default_target_size() -> usize {
    DEFAULT_TARGET_SIZE
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
        }
    }
}

impl ChunkSettings {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            target_size: self.target_size,
        }
    }
}

/// 跨页修复配置
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// 句末标点
    #[serde(default = "default_terminal_marks")]
    pub terminal_marks: String,

    /// 是否跳过句末的闭合引号/括号
    #[serde(default = "default_skip_trailing_closers")]
    pub skip_trailing_closers: bool,
}

fn default_terminal_marks() -> String {
    DEFAULT_TERMINAL_MARKS.to_string()
}

fn default_skip_trailing_closers() -> bool {
    true
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            terminal_marks: default_terminal_marks(),
            skip_trailing_closers: default_skip_trailing_closers(),
        }
    }
}

impl ReconcileConfig {
    pub fn terminal_marks(&self) -> TerminalMarks {
        TerminalMarks::new(&self.terminal_marks, self.skip_trailing_closers)
    }
}

/// 提取服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// 服务商: openai, deepseek, qianwen, ernie, fake
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub api_key: String,

    /// 仅 ernie 使用
    #[serde(default)]
    pub secret_key: String,

    /// 覆盖服务商的默认模型
    #[serde(default)]
    pub model: Option<String>,

    /// 覆盖服务商的默认接口地址
    #[serde(default)]
    pub base_url: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,

    /// 覆盖默认系统提示词
    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_extractor_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            secret_key: String::new(),
            model: None,
            base_url: None,
            timeout_secs: default_extractor_timeout(),
            system_prompt: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// 输出存储模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// 每个结果立即追加到最终文件
    #[default]
    Append,
    /// 分批写入临时文件，结束时合并
    Batch,
}

/// 运行配置
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub storage_mode: OutputMode,

    /// 批量模式下每处理多少个单元刷新一次
    #[serde(default = "default_dump_interval")]
    pub dump_interval: usize,

    /// 每次提取调用之后的等待时间（毫秒）
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,
}

fn default_dump_interval() -> usize {
    10
}

fn default_call_delay_ms() -> u64 {
    1000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            storage_mode: OutputMode::default(),
            dump_interval: default_dump_interval(),
            call_delay_ms: default_call_delay_ms(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.units_dir, PathBuf::from("sep_pages"));
        assert_eq!(config.chunk.target_size, 2000);
        assert_eq!(config.extractor.provider, "openai");
        assert_eq!(config.run.storage_mode, OutputMode::Append);
        assert_eq!(config.run.dump_interval, 10);
        assert_eq!(config.run.call_delay_ms, 1000);
    }

    #[test]
    fn test_terminal_marks_from_config() {
        let config = ReconcileConfig {
            terminal_marks: "。".to_string(),
            skip_trailing_closers: false,
        };
        let marks = config.terminal_marks();
        assert!(marks.terminates("好。"));
        assert!(!marks.terminates("好！"));
    }
}
