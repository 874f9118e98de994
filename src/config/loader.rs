//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行参数（由 main 覆盖）
//! 2. 环境变量
//! 3. 配置文件（jinju.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["jinju", "jinju.local"];

const KNOWN_PROVIDERS: &[&str] = &[
    "openai", "deepseek", "qianwen", "qwen", "dashscope", "ernie", "wenxin", "fake",
];

/// 加载应用配置
///
/// # 环境变量示例
/// - `JINJU_EXTRACTOR__PROVIDER=deepseek`
/// - `JINJU_EXTRACTOR__API_KEY=sk-...`
/// - `JINJU_RUN__STORAGE_MODE=batch`
/// - `JINJU_CHUNK__TARGET_SIZE=1500`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("storage.units_dir", "sep_pages")?
        .set_default("storage.output_dir", "output")?
        .set_default("chunk.target_size", 2000)?
        .set_default("reconcile.terminal_marks", "。！？.!?")?
        .set_default("reconcile.skip_trailing_closers", true)?
        .set_default("extractor.provider", "openai")?
        .set_default("extractor.timeout_secs", 60)?
        .set_default("run.storage_mode", "append")?
        .set_default("run.dump_interval", 10)?
        .set_default("run.call_delay_ms", 1000)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量
    // 前缀: JINJU_
    // 层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("JINJU")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.chunk.target_size == 0 {
        return Err(ConfigError::ValidationError(
            "Chunk target size cannot be 0".to_string(),
        ));
    }

    if config.run.dump_interval == 0 {
        return Err(ConfigError::ValidationError(
            "Dump interval cannot be 0".to_string(),
        ));
    }

    if config.storage.units_dir.as_os_str().is_empty()
        || config.storage.output_dir.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Storage directories cannot be empty".to_string(),
        ));
    }

    if config.reconcile.terminal_marks.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Terminal marks cannot be empty".to_string(),
        ));
    }

    let provider = config.extractor.provider.trim().to_lowercase();
    if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "Unknown extractor provider: {}",
            config.extractor.provider
        )));
    }

    Ok(())
}

/// 只保留密钥首尾各 4 位
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        "(unset)".to_string()
    } else if chars.len() <= 8 {
        "****".to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Units Directory: {:?}", config.storage.units_dir);
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Chunk Target Size: {}", config.chunk.target_size);
    tracing::info!("Terminal Marks: {}", config.reconcile.terminal_marks);
    tracing::info!("Provider: {}", config.extractor.provider);
    if let Some(model) = &config.extractor.model {
        tracing::info!("Model: {}", model);
    }
    tracing::info!("API Key: {}", mask_secret(&config.extractor.api_key));
    if !config.extractor.secret_key.is_empty() {
        tracing::info!("Secret Key: {}", mask_secret(&config.extractor.secret_key));
    }
    tracing::info!("Storage Mode: {:?}", config.run.storage_mode);
    if config.run.storage_mode == super::types::OutputMode::Batch {
        tracing::info!("Dump Interval: {}", config.run.dump_interval);
    }
    tracing::info!("Call Delay: {}ms", config.run.call_delay_ms);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
