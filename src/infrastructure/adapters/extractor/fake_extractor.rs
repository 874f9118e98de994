//! Fake Extractor - 用于离线运行和测试的提取器
//!
//! 不调用任何服务，按终止标点切句后返回指定长度以上的句子

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{ExtractionError, SentenceExtractorPort};
use crate::domain::DEFAULT_TERMINAL_MARKS;

/// Fake Extractor 配置
#[derive(Debug, Clone)]
pub struct FakeExtractorConfig {
    /// 句子最少字符数，短于此的句子不返回
    pub min_sentence_chars: usize,
    /// 模拟调用延迟
    pub latency: Duration,
}

impl Default for FakeExtractorConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: 6,
            latency: Duration::ZERO,
        }
    }
}

/// Fake Extractor
pub struct FakeExtractor {
    config: FakeExtractorConfig,
}

impl FakeExtractor {
    pub fn new(config: FakeExtractorConfig) -> Self {
        tracing::info!(
            min_sentence_chars = config.min_sentence_chars,
            "FakeExtractor initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeExtractorConfig::default())
    }

    fn pick_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for c in text.chars() {
            if c == '\n' {
                current.clear();
                continue;
            }
            current.push(c);
            if DEFAULT_TERMINAL_MARKS.contains(c) {
                let sentence = current.trim().to_string();
                if sentence.chars().count() >= self.config.min_sentence_chars {
                    sentences.push(sentence);
                }
                current.clear();
            }
        }

        sentences
    }
}

#[async_trait]
impl SentenceExtractorPort for FakeExtractor {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn extract(
        &self,
        text: &str,
        _instruction: Option<&str>,
    ) -> Result<String, ExtractionError> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        Ok(self.pick_sentences(text).join("\n"))
    }
}
