//! Extractor Adapter - 文学句子提取服务实现

mod chat_completion_client;
mod ernie_client;
mod factory;
mod fake_extractor;
mod prompts;

pub use chat_completion_client::{ChatCompletionClient, ChatCompletionConfig};
pub use ernie_client::{ErnieClient, ErnieClientConfig};
pub use factory::{create_extractor, ProviderKind};
pub use fake_extractor::{FakeExtractor, FakeExtractorConfig};
pub use prompts::DEFAULT_SYSTEM_PROMPT;
