//! Jinju - 分页文档文学句子提取
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Document Context: 页面、内容单元、处理范围、文档摘要
//! - 跨页修复器与分块器
//!
//! 应用层 (application/):
//! - Ports: 端口定义（DocumentReader, UnitStore, SentenceExtractor, ResultSink）
//! - Commands: 导入与提取处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: 文本读取器、提取服务客户端、输出汇总器
//! - Persistence: 文件目录单元库

pub mod application;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use bootstrap::Pipeline;
pub use config::{load_config, AppConfig};
