//! Commands - 命令及处理器
//!
//! - 导入：读取 → 跨页修复 → 分块 → 持久化
//! - 提取：范围解析 → 逐单元调用提取服务 → 汇总输出

mod extract_commands;
pub mod handlers;

pub use extract_commands::{RunExtraction, RunLibraryExtraction};
