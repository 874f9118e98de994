//! Extraction Commands

use crate::domain::document::DocumentName;

/// 对单个文档执行提取
#[derive(Debug, Clone)]
pub struct RunExtraction {
    pub document: DocumentName,
    /// 起始单元（1-based，含），None 表示从头开始
    pub start: Option<usize>,
    /// 结束单元（1-based，含），None 表示到最后
    pub end: Option<usize>,
    /// 自定义指令，覆盖默认系统提示词
    pub instruction: Option<String>,
}

/// 对多个文档依次执行提取
#[derive(Debug, Clone, Default)]
pub struct RunLibraryExtraction {
    /// 为空时处理单元库中的全部文档
    pub documents: Vec<DocumentName>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub instruction: Option<String>,
}

impl RunLibraryExtraction {
    /// 拆成单文档命令
    pub fn for_document(&self, document: DocumentName) -> RunExtraction {
        RunExtraction {
            document,
            start: self.start,
            end: self.end,
            instruction: self.instruction.clone(),
        }
    }
}
