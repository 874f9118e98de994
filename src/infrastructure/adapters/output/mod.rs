//! Output Adapter - 提取结果输出

mod aggregator;
mod checkpoint;
mod section;

pub use aggregator::{
    AggregatorState, OutputAggregator, OutputAggregatorFactory, OutputBatch, StorageMode,
};
pub use checkpoint::{BatchCheckpoint, BatchRecord, SectionSpan};
pub use section::render_section;
