//! Sentence Extractor Port - 文学句子提取服务抽象
//!
//! 每个模型服务商一个实现，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 提取错误
///
/// 驱动层把任何错误都当作"未发现内容"处理，不会中断运行
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractionError::Timeout
        } else if err.is_decode() {
            ExtractionError::InvalidResponse(err.to_string())
        } else {
            ExtractionError::NetworkError(err.to_string())
        }
    }
}

/// Sentence Extractor Port
#[async_trait]
pub trait SentenceExtractorPort: Send + Sync {
    /// 服务商名称（用于日志）
    fn provider_name(&self) -> &str;

    /// 从文本中提取文学性句子
    ///
    /// `instruction` 为自定义指令，覆盖默认的系统提示词
    async fn extract(&self, text: &str, instruction: Option<&str>)
        -> Result<String, ExtractionError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
