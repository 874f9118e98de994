//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod extractor;
pub mod output;
pub mod reader;

pub use extractor::*;
pub use output::*;
pub use reader::*;
