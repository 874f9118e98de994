//! Persistence Layer - 数据持久化
//!
//! 文件目录存储实现

pub mod file;

pub use self::file::FileUnitStore;
pub(crate) use self::file::write_atomic;
