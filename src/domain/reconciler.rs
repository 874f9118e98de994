//! 跨页修复器
//!
//! 修复被分页截断的句子：上一页末段未以句末标点结束时并入当前页开头，
//! 当前页未以句末标点结束时并入下一页首段。

use super::document::RawPage;

/// 默认句末标点
pub const DEFAULT_TERMINAL_MARKS: &str = "。！？.!?";

/// 句末标点之后允许出现的闭合符号（引号、括号）
const TRAILING_CLOSERS: &[char] = &[
    '"', '\'', '\u{201D}', '\u{2019}', '」', '』', '）', ')', '》', '】',
];

/// 句末标点集合
#[derive(Debug, Clone)]
pub struct TerminalMarks {
    marks: Vec<char>,
    /// 判断时是否跳过末尾的闭合引号/括号（如 `“好。”`）
    skip_trailing_closers: bool,
}

impl Default for TerminalMarks {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_MARKS, true)
    }
}

impl TerminalMarks {
    pub fn new(marks: &str, skip_trailing_closers: bool) -> Self {
        Self {
            marks: marks.chars().filter(|c| !c.is_whitespace()).collect(),
            skip_trailing_closers,
        }
    }

    /// 严格模式：只看最后一个字符
    pub fn strict(marks: &str) -> Self {
        Self::new(marks, false)
    }

    #[inline]
    fn is_terminal(&self, ch: char) -> bool {
        self.marks.contains(&ch)
    }

    /// 文本是否以句末标点结束（忽略末尾空白）
    pub fn terminates(&self, text: &str) -> bool {
        let mut chars = text.trim_end().chars().rev();
        while let Some(ch) = chars.next() {
            if self.is_terminal(ch) {
                return true;
            }
            if self.skip_trailing_closers && TRAILING_CLOSERS.contains(&ch) {
                continue;
            }
            return false;
        }
        false
    }
}

/// 最后一段：最后一个换行之后的文本，没有换行则为全文
#[inline]
fn last_paragraph(text: &str) -> &str {
    match text.rfind('\n') {
        Some(pos) => &text[pos + 1..],
        None => text,
    }
}

/// 第一段：第一个换行之前的文本
#[inline]
fn first_paragraph(text: &str) -> &str {
    match text.find('\n') {
        Some(pos) => &text[..pos],
        None => text,
    }
}

/// 对整份文档的原始页面做跨页修复
///
/// 返回与输入一一对应的修正文本（按页序）。空页原样透传。
/// 前一页取其已修正的文本，后一页取其原始文本。
pub fn reconcile_pages(pages: &[RawPage], marks: &TerminalMarks) -> Vec<String> {
    let mut corrected: Vec<String> = Vec::with_capacity(pages.len());

    for (i, page) in pages.iter().enumerate() {
        let raw = page.text();
        if raw.is_empty() {
            corrected.push(String::new());
            continue;
        }

        let mut text = raw.to_string();

        if let Some(prev) = i.checked_sub(1).map(|p| corrected[p].as_str()) {
            if !prev.is_empty() && !marks.terminates(prev) {
                let tail = last_paragraph(prev);
                if !tail.is_empty() {
                    text.insert_str(0, tail);
                }
            }
        }

        if let Some(next) = pages.get(i + 1).map(RawPage::text) {
            if !next.is_empty() && !marks.terminates(&text) {
                let head = first_paragraph(next);
                if !head.is_empty() {
                    text.push_str(head);
                }
            }
        }

        if text.len() != raw.len() {
            tracing::trace!(
                page = page.index(),
                added_chars = text.chars().count() - raw.chars().count(),
                "Page boundary reconciled"
            );
        }

        corrected.push(text);
    }

    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<RawPage> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| RawPage::new(i + 1, *t, "测试", texts.len()))
            .collect()
    }

    #[test]
    fn test_split_sentence_scenario() {
        let raw = pages(&["春风吹。", "花开", "了。"]);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        assert_eq!(corrected, vec!["春风吹。", "花开了。", "了。"]);
    }

    #[test]
    fn test_terminated_pages_unchanged() {
        let texts = ["第一页。", "第二页！\n第二段？", "Third page.", "第四页。"];
        let raw = pages(&texts);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        assert_eq!(corrected, texts.to_vec());
    }

    #[test]
    fn test_prepend_uses_only_last_paragraph() {
        // 第二页首段为空，第一页无法向后补全，只能由第二页向前拼接
        let raw = pages(&["完整的一段。\n被截断的", "\n下一段。"]);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        assert_eq!(corrected[0], "完整的一段。\n被截断的");
        assert_eq!(corrected[1], "被截断的\n下一段。");
    }

    #[test]
    fn test_repaired_predecessor_is_not_prepended() {
        let raw = pages(&["完整的一段。\n被截断的", "句子结束了。"]);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        assert_eq!(corrected[0], "完整的一段。\n被截断的句子结束了。");
        assert_eq!(corrected[1], "句子结束了。");
    }

    #[test]
    fn test_append_uses_only_first_paragraph() {
        let raw = pages(&["她说", "得很慢。\n另一段。"]);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        assert_eq!(corrected[0], "她说得很慢。");
    }

    #[test]
    fn test_empty_pages_pass_through() {
        let raw = pages(&["没有结束", "", "下一页。"]);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        // 相邻页为空时不拼接
        assert_eq!(corrected, vec!["没有结束", "", "下一页。"]);
    }

    #[test]
    fn test_first_and_last_page_edges() {
        let raw = pages(&["开头", "结尾"]);
        let corrected = reconcile_pages(&raw, &TerminalMarks::default());

        assert_eq!(corrected[0], "开头结尾");
        // 前一页修正后仍未结束，末段为 "开头结尾"
        assert_eq!(corrected[1], "开头结尾结尾");
        assert_eq!(corrected.len(), 2);
    }

    #[test]
    fn test_single_page_untouched() {
        let raw = pages(&["孤零零的一页"]);
        assert_eq!(
            reconcile_pages(&raw, &TerminalMarks::default()),
            vec!["孤零零的一页"]
        );
    }

    #[test]
    fn test_closing_quote_counts_as_terminated() {
        let marks = TerminalMarks::default();
        assert!(marks.terminates("他说：“好。”"));
        assert!(marks.terminates("结束。 \n"));
        assert!(!marks.terminates("没有结束"));
        assert!(!marks.terminates(""));

        let strict = TerminalMarks::strict(DEFAULT_TERMINAL_MARKS);
        assert!(!strict.terminates("他说：“好。”"));
    }

    #[test]
    fn test_custom_marks() {
        let marks = TerminalMarks::new("。…", true);
        assert!(marks.terminates("余音未了…"));
        assert!(!marks.terminates("Done."));
    }
}
