//! Text Document Reader - 纯文本文档读取
//!
//! 实现 DocumentReaderPort trait
//!
//! - 分页文本：页与页之间以换页符 `\x0C` 分隔（pdftotext 的输出约定）
//! - 分章文本：以 `第…章` / `Chapter N` 开头的行作为章节起点

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use crate::application::ports::{DocumentReaderPort, ReadError};
use crate::domain::document::{DocumentFormat, DocumentName};

const FORM_FEED: u8 = 0x0C;

/// 纯文本文档读取器
///
/// 打开时一次性读入整个文件并切分，单页解码失败只影响该页
pub struct TextDocumentReader {
    name: DocumentName,
    format: DocumentFormat,
    pages: Vec<Vec<u8>>,
}

impl TextDocumentReader {
    /// 打开文件；format 为 None 时按内容自动判断（含换页符即为分页文本）
    pub async fn open(
        path: impl AsRef<Path>,
        format: Option<DocumentFormat>,
    ) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let data = fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReadError::NotFound(path.display().to_string())
            } else {
                ReadError::IoError(e.to_string())
            }
        })?;

        let name = DocumentName::from_path(path)
            .map_err(|e| ReadError::IoError(format!("{}: {}", path.display(), e)))?;

        let format = format.unwrap_or_else(|| detect_format(&data));
        let pages = match format {
            DocumentFormat::Paged => split_pages(&data),
            DocumentFormat::Chaptered => split_chapters(&data),
        };

        tracing::debug!(
            document = %name,
            format = %format,
            pages = pages.len(),
            bytes = data.len(),
            "Document opened"
        );

        Ok(Self {
            name,
            format,
            pages,
        })
    }
}

fn detect_format(data: &[u8]) -> DocumentFormat {
    if data.contains(&FORM_FEED) {
        DocumentFormat::Paged
    } else {
        DocumentFormat::Chaptered
    }
}

/// 按换页符切分；文件末尾的换页符不产生额外的空页
fn split_pages(data: &[u8]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return Vec::new();
    }
    let body = data.strip_suffix(&[FORM_FEED][..]).unwrap_or(data);
    body.split(|b| *b == FORM_FEED).map(<[u8]>::to_vec).collect()
}

/// 按章节标题切分；标题之前的非空内容作为独立的一章
///
/// 按字节切行，章节内容保持原始字节，解码留给 read_page，
/// 因此坏字节只影响所在的那一章
fn split_chapters(data: &[u8]) -> Vec<Vec<u8>> {
    let mut chapters: Vec<Vec<&[u8]>> = Vec::new();
    let mut current: Vec<&[u8]> = Vec::new();

    for line in data.split(|b| *b == b'\n').map(trim_line_end) {
        if line.is_empty() {
            continue;
        }
        if !current.is_empty() && is_heading_line(line) {
            chapters.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        chapters.push(current);
    }

    chapters.into_iter().map(|lines| lines.join(&b'\n')).collect()
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    match std::str::from_utf8(line) {
        Ok(text) => text.trim_end().as_bytes(),
        Err(_) => line.trim_ascii_end(),
    }
}

fn is_heading_line(line: &[u8]) -> bool {
    std::str::from_utf8(line).is_ok_and(is_chapter_heading)
}

/// `第十二章 …`、`第12章`、`Chapter 12`、`CHAPTER XII`
fn is_chapter_heading(line: &str) -> bool {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('第') {
        if let Some(pos) = rest.find('章') {
            let numeral = &rest[..pos];
            return !numeral.is_empty()
                && numeral.chars().count() <= 8
                && numeral.chars().all(is_numeral_char);
        }
        return false;
    }

    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), Some(number)) if word.eq_ignore_ascii_case("chapter") => {
            let number = number.trim_end_matches(|c: char| c == '.' || c == ':');
            !number.is_empty()
                && (number.chars().all(|c| c.is_ascii_digit())
                    || number.chars().all(|c| "IVXLCDMivxlcdm".contains(c)))
        }
        _ => false,
    }
}

fn is_numeral_char(c: char) -> bool {
    c.is_ascii_digit() || "零〇一二三四五六七八九十百千两".contains(c)
}

/// 统一换行符并去掉首尾空白
fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

#[async_trait]
impl DocumentReaderPort for TextDocumentReader {
    fn document_name(&self) -> &DocumentName {
        &self.name
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn read_page(&self, index: usize) -> Result<String, ReadError> {
        let bytes = index
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or(ReadError::PageOutOfRange {
                index,
                total: self.pages.len(),
            })?;

        let text = std::str::from_utf8(bytes).map_err(|e| ReadError::DecodeError {
            index,
            reason: e.to_string(),
        })?;

        Ok(normalize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn write(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_paged_text_split_on_form_feed() {
        let temp_dir = tempdir().unwrap();
        let path = write(temp_dir.path(), "边城.txt", "第一页。\r\n\x0C第二页\x0C\x0C第四页。\x0C".as_bytes()).await;

        let reader = TextDocumentReader::open(&path, None).await.unwrap();

        assert_eq!(reader.document_name().as_str(), "边城");
        assert_eq!(reader.format(), DocumentFormat::Paged);
        assert_eq!(reader.page_count(), 4);
        assert_eq!(reader.read_page(1).await.unwrap(), "第一页。");
        assert_eq!(reader.read_page(3).await.unwrap(), "");
        assert_eq!(reader.read_page(4).await.unwrap(), "第四页。");
        assert!(matches!(
            reader.read_page(5).await,
            Err(ReadError::PageOutOfRange { index: 5, total: 4 })
        ));
    }

    #[tokio::test]
    async fn test_undecodable_page_fails_alone() {
        let temp_dir = tempdir().unwrap();
        let mut data = "好的一页。\x0C".as_bytes().to_vec();
        data.extend_from_slice(&[0xFF, 0xFE, 0xFD]);
        data.extend_from_slice("\x0C又一页。".as_bytes());
        let path = write(temp_dir.path(), "坏页.txt", &data).await;

        let reader = TextDocumentReader::open(&path, Some(DocumentFormat::Paged))
            .await
            .unwrap();

        assert_eq!(reader.page_count(), 3);
        assert!(matches!(
            reader.read_page(2).await,
            Err(ReadError::DecodeError { index: 2, .. })
        ));
        assert_eq!(reader.read_page(3).await.unwrap(), "又一页。");
    }

    #[tokio::test]
    async fn test_chaptered_text_split_on_headings() {
        let temp_dir = tempdir().unwrap();
        let text = "序\n\n这是序言。\n第一章 出发\n\n天亮了。\n  \n第二章 归来\n夜深了。\n";
        let path = write(temp_dir.path(), "长篇.txt", text.as_bytes()).await;

        let reader = TextDocumentReader::open(&path, None).await.unwrap();

        assert_eq!(reader.format(), DocumentFormat::Chaptered);
        assert_eq!(reader.page_count(), 3);
        assert_eq!(reader.read_page(1).await.unwrap(), "序\n这是序言。");
        assert_eq!(reader.read_page(2).await.unwrap(), "第一章 出发\n天亮了。");
        assert_eq!(reader.read_page(3).await.unwrap(), "第二章 归来\n夜深了。");
    }

    #[tokio::test]
    async fn test_undecodable_chapter_fails_alone() {
        let temp_dir = tempdir().unwrap();
        let mut data = "第一章 甲\n好的一章。\n第二章 乙\n".as_bytes().to_vec();
        data.extend_from_slice(&[0xFF, 0xFE]);
        data.extend_from_slice("\n第三章 丙\n又一章。\n".as_bytes());
        let path = write(temp_dir.path(), "坏章.txt", &data).await;

        let reader = TextDocumentReader::open(&path, Some(DocumentFormat::Chaptered))
            .await
            .unwrap();

        assert_eq!(reader.page_count(), 3);
        assert_eq!(reader.read_page(1).await.unwrap(), "第一章 甲\n好的一章。");
        assert!(matches!(
            reader.read_page(2).await,
            Err(ReadError::DecodeError { index: 2, .. })
        ));
        assert_eq!(reader.read_page(3).await.unwrap(), "第三章 丙\n又一章。");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result = TextDocumentReader::open(temp_dir.path().join("无.txt"), None).await;
        assert!(matches!(result, Err(ReadError::NotFound(_))));
    }

    #[test]
    fn test_chapter_heading_detection() {
        assert!(is_chapter_heading("第十二章 雪"));
        assert!(is_chapter_heading("第12章"));
        assert!(is_chapter_heading("Chapter 3"));
        assert!(is_chapter_heading("CHAPTER XII."));
        assert!(!is_chapter_heading("第二天他走了章"));
        assert!(!is_chapter_heading("Chapters of life"));
        assert!(!is_chapter_heading("他说第一章写得好"));
    }
}
