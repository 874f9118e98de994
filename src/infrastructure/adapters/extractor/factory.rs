//! Extractor Factory - 按服务商创建提取器

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::application::ports::{ExtractionError, SentenceExtractorPort};
use crate::config::ExtractorConfig;

use super::chat_completion_client::{ChatCompletionClient, ChatCompletionConfig};
use super::ernie_client::{ErnieClient, ErnieClientConfig};
use super::fake_extractor::FakeExtractor;
use super::prompts::DEFAULT_SYSTEM_PROMPT;

/// 支持的服务商
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    DeepSeek,
    Qianwen,
    Ernie,
    Fake,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Qianwen => "qianwen",
            ProviderKind::Ernie => "ernie",
            ProviderKind::Fake => "fake",
        }
    }

    /// OpenAI 兼容服务商的默认地址与模型
    fn chat_defaults(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ProviderKind::OpenAi => Some((
                "https://api.openai.com/v1/chat/completions",
                "gpt-3.5-turbo",
            )),
            ProviderKind::DeepSeek => Some((
                "https://api.deepseek.com/v1/chat/completions",
                "deepseek-chat",
            )),
            ProviderKind::Qianwen => Some((
                "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions",
                "qwen-turbo",
            )),
            ProviderKind::Ernie | ProviderKind::Fake => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "qianwen" | "qwen" | "dashscope" => Ok(ProviderKind::Qianwen),
            "ernie" | "wenxin" => Ok(ProviderKind::Ernie),
            "fake" => Ok(ProviderKind::Fake),
            other => Err(ExtractionError::NotConfigured(format!(
                "unsupported provider: {}",
                other
            ))),
        }
    }
}

/// 根据配置创建提取器
pub fn create_extractor(
    config: &ExtractorConfig,
) -> Result<Arc<dyn SentenceExtractorPort>, ExtractionError> {
    let kind: ProviderKind = config.provider.parse()?;
    let system_prompt = config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let extractor: Arc<dyn SentenceExtractorPort> = match kind {
        ProviderKind::Fake => Arc::new(FakeExtractor::with_defaults()),
        ProviderKind::Ernie => {
            let mut ernie = ErnieClientConfig::new(&config.api_key, &config.secret_key)
                .with_timeout(config.timeout_secs);
            if let Some(base_url) = &config.base_url {
                ernie.chat_url = base_url.clone();
            }
            ernie.system_prompt = system_prompt;
            Arc::new(ErnieClient::new(ernie)?)
        }
        _ => {
            let (endpoint, model) = kind.chat_defaults().ok_or_else(|| {
                ExtractionError::NotConfigured(format!("no endpoint for {}", kind))
            })?;
            let mut chat = ChatCompletionConfig::new(
                kind.as_str(),
                config.base_url.as_deref().unwrap_or(endpoint),
                config.model.as_deref().unwrap_or(model),
            )
            .with_api_key(&config.api_key)
            .with_timeout(config.timeout_secs)
            .with_system_prompt(system_prompt);
            chat.temperature = config.temperature;
            chat.max_tokens = config.max_tokens;
            Arc::new(ChatCompletionClient::new(chat)?)
        }
    };

    tracing::info!(provider = %kind, "Extractor created");
    Ok(extractor)
}
