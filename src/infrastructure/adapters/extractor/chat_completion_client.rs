//! Chat Completion Client - OpenAI 兼容接口
//!
//! 实现 SentenceExtractorPort trait
//!
//! OpenAI、DeepSeek 以及通义千问（DashScope compatible-mode）共用同一协议:
//! POST {endpoint}
//! Request: {"model": "...", "messages": [...], "temperature": 0.7, "max_tokens": 1000}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::application::ports::{ExtractionError, SentenceExtractorPort};

use super::prompts::{self, DEFAULT_SYSTEM_PROMPT};

/// Chat Completion 客户端配置
#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    /// 服务商名称（日志用）
    pub provider: String,
    /// 完整的 chat/completions 地址
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for ChatCompletionConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 60,
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatCompletionConfig {
    pub fn new(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// OpenAI 兼容的 Chat Completion 客户端
pub struct ChatCompletionClient {
    client: Client,
    config: ChatCompletionConfig,
}

impl ChatCompletionClient {
    pub fn new(config: ChatCompletionConfig) -> Result<Self, ExtractionError> {
        if config.api_key.trim().is_empty() {
            return Err(ExtractionError::NotConfigured(format!(
                "{}: api_key is empty",
                config.provider
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 模型列表地址，用于健康检查
    fn models_url(&self) -> String {
        let endpoint = self.config.endpoint.trim_end_matches('/');
        match endpoint.strip_suffix("/chat/completions") {
            Some(base) => format!("{}/models", base),
            None => endpoint.to_string(),
        }
    }
}

#[async_trait]
impl SentenceExtractorPort for ChatCompletionClient {
    fn provider_name(&self) -> &str {
        &self.config.provider
    }

    async fn extract(
        &self,
        text: &str,
        instruction: Option<&str>,
    ) -> Result<String, ExtractionError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": prompts::system_prompt(&self.config.system_prompt, instruction),
                },
                {
                    "role": "user",
                    "content": prompts::user_prompt(text),
                },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        tracing::debug!(
            provider = %self.config.provider,
            url = %self.config.endpoint,
            model = %self.config.model,
            text_len = text.chars().count(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout
                } else if e.is_connect() {
                    ExtractionError::NetworkError(format!(
                        "Cannot connect to {}: {}",
                        self.config.provider, e
                    ))
                } else {
                    ExtractionError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::AuthError(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let resp: serde_json::Value = response.json().await?;
        parse_chat_response(&resp)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.models_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(provider = %self.config.provider, error = %e, "Health check failed");
                false
            }
        }
    }
}

fn parse_chat_response(resp: &serde_json::Value) -> Result<String, ExtractionError> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            ExtractionError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let resp = json!({
            "choices": [{"message": {"role": "assistant", "content": "  月光如水。\n"}}]
        });
        assert_eq!(parse_chat_response(&resp).unwrap(), "月光如水。");

        let bad = json!({"error": {"message": "quota"}});
        assert!(matches!(
            parse_chat_response(&bad),
            Err(ExtractionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = ChatCompletionConfig::default();
        assert!(matches!(
            ChatCompletionClient::new(config),
            Err(ExtractionError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_models_url_derived_from_endpoint() {
        let config = ChatCompletionConfig::new(
            "qianwen",
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions",
            "qwen-turbo",
        )
        .with_api_key("sk-test");
        let client = ChatCompletionClient::new(config).unwrap();
        assert_eq!(
            client.models_url(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/models"
        );
    }
}
