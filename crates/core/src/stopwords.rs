//! Built-in stopword list and per-request extension handling.
//!
//! The defaults cover high-frequency Chinese function words. Requests may
//! extend (never replace) the defaults with a `stopword` parameter
//! carrying either a single word or a list of words.

use std::collections::HashSet;

/// Words excluded from `tok` output and word-frequency counting by default.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "的", "了", "和", "是", "在", "我", "有", "他", "这", "中", "大", "来",
    "上", "国", "个", "到", "说", "们", "为", "子", "与", "也", "就", "着",
    "不", "之", "于", "而", "其", "吗", "呢", "吧", "啊", "把", "被", "让",
    "从", "向", "对", "或", "及", "等", "所", "以", "很", "再", "还", "都",
];

/// Build the effective stopword set for one request.
///
/// `extra` entries extend the defaults; empty or whitespace-only entries
/// are ignored.
pub fn build_stopword_set(extra: &[String]) -> HashSet<String> {
    let mut set: HashSet<String> = DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect();
    for word in extra {
        let trimmed = word.trim();
        if !trimmed.is_empty() {
            set.insert(trimmed.to_string());
        }
    }
    set
}
