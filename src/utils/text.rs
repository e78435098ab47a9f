//! 文本清洗
//!
//! 门户表格单元格里混杂换行、制表符和连续空白，
//! 统一压缩成单个空格并去掉首尾空白

use regex::Regex;
use std::collections::HashMap;

/// 清洗并规范化一段文本
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    // 换行 / 制表符先换成空格，再压缩连续空白
    let replaced = text.replace(['\n', '\t'], " ");
    let re = whitespace_re();
    re.replace_all(&replaced, " ").trim().to_string()
}

fn whitespace_re() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// 带记忆的文本清洗缓存
///
/// 表格里大量单元格内容重复（成绩代码、语言列等），
/// 缓存由采集器实例持有，互不干扰
#[derive(Debug, Default)]
pub struct TextCache {
    memo: HashMap<String, String>,
}

/// 缓存容量上限，超过后整体清空重来
const TEXT_CACHE_LIMIT: usize = 1000;

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清洗文本，命中缓存时直接返回
    pub fn clean(&mut self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        if let Some(cached) = self.memo.get(text) {
            return cached.clone();
        }

        let cleaned = clean_text(text);

        if self.memo.len() >= TEXT_CACHE_LIMIT {
            self.memo.clear();
        }
        self.memo.insert(text.to_string(), cleaned.clone());
        cleaned
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.memo.len()
    }
}
