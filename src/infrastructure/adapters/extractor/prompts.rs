//! 提示词

/// 默认系统提示词
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一个专业的文学鉴赏家，善于发现文本中富有文学性的句子。这些句子应该具有优美的意境、独特的比喻、生动的描写或深刻的哲理。";

const USER_PROMPT_PREFIX: &str =
    "请从以下文本中提取出具有文学性的句子，直接列出句子即可，每个句子单独一行：\n\n";

/// 用户消息
pub fn user_prompt(text: &str) -> String {
    format!("{}{}", USER_PROMPT_PREFIX, text)
}

/// 系统消息：自定义指令优先，其次是配置的提示词
pub fn system_prompt<'a>(configured: &'a str, instruction: Option<&'a str>) -> &'a str {
    match instruction {
        Some(instruction) if !instruction.trim().is_empty() => instruction,
        _ => configured,
    }
}
