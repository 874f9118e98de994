//! Ernie Client - 百度文心一言
//!
//! 实现 SentenceExtractorPort trait
//!
//! 先以 client_credentials 换取 access_token（首次调用时获取并缓存），
//! 再以 query 参数携带 token 调用对话接口，回复在 `result` 字段中。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::ports::{ExtractionError, SentenceExtractorPort};

use super::prompts::{self, DEFAULT_SYSTEM_PROMPT};

const TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";
const CHAT_URL: &str =
    "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions";

/// 文心一言客户端配置
#[derive(Debug, Clone)]
pub struct ErnieClientConfig {
    pub api_key: String,
    pub secret_key: String,
    pub token_url: String,
    pub chat_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub system_prompt: String,
}

impl Default for ErnieClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            token_url: TOKEN_URL.to_string(),
            chat_url: CHAT_URL.to_string(),
            timeout_secs: 60,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ErnieClientConfig {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 文心一言客户端
pub struct ErnieClient {
    client: Client,
    config: ErnieClientConfig,
    /// 缓存的 access_token
    access_token: Mutex<Option<String>>,
}

impl ErnieClient {
    pub fn new(config: ErnieClientConfig) -> Result<Self, ExtractionError> {
        if config.api_key.trim().is_empty() || config.secret_key.trim().is_empty() {
            return Err(ExtractionError::NotConfigured(
                "ernie: api_key and secret_key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            access_token: Mutex::new(None),
        })
    }

    /// 取得 access_token，没有缓存时向鉴权接口申请
    async fn access_token(&self) -> Result<String, ExtractionError> {
        let mut cached = self.access_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        tracing::debug!("Requesting ernie access token");

        let response = self
            .client
            .get(&self.config.token_url)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.api_key.as_str()),
                ("client_secret", self.config.secret_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::AuthError(format!("HTTP {}: {}", status, body)));
        }

        let resp: serde_json::Value = response.json().await?;
        let token = resp["access_token"]
            .as_str()
            .ok_or_else(|| ExtractionError::AuthError("missing access_token".to_string()))?
            .to_string();

        *cached = Some(token.clone());
        Ok(token)
    }

    async fn invalidate_token(&self) {
        *self.access_token.lock().await = None;
    }
}

#[async_trait]
impl SentenceExtractorPort for ErnieClient {
    fn provider_name(&self) -> &str {
        "ernie"
    }

    async fn extract(
        &self,
        text: &str,
        instruction: Option<&str>,
    ) -> Result<String, ExtractionError> {
        let token = self.access_token().await?;

        let body = json!({
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
        });

        tracing::debug!(
            text_len = text.chars().count(),
            "Sending ernie chat request"
        );

        let response = self
            .client
            .post(&self.config.chat_url)
            .query(&[("access_token", token.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let resp: serde_json::Value = response.json().await?;
        match parse_ernie_response(&resp) {
            Err(ExtractionError::AuthError(e)) => {
                // token 过期，下次调用重新申请
                self.invalidate_token().await;
                Err(ExtractionError::AuthError(e))
            }
            other => other,
        }
    }

    async fn health_check(&self) -> bool {
        match self.access_token().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(provider = "ernie", error = %e, "Health check failed");
                false
            }
        }
    }
}

/// 错误码 110/111 表示 access_token 无效或过期
fn parse_ernie_response(resp: &serde_json::Value) -> Result<String, ExtractionError> {
    if let Some(code) = resp["error_code"].as_i64() {
        let message = resp["error_msg"].as_str().unwrap_or_default().to_string();
        return Err(match code {
            110 | 111 => ExtractionError::AuthError(message),
            _ => ExtractionError::InvalidResponse(format!("error_code {}: {}", code, message)),
        });
    }

    resp["result"]
        .as_str()
        .map(|result| result.trim().to_string())
        .ok_or_else(|| ExtractionError::InvalidResponse("missing result".to_string()))
}
