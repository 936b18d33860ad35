//! Word-frequency counting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry in a word-frequency result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Count token frequencies and return the `max_words` most frequent.
///
/// Ordering: count descending, ties broken by first appearance in the
/// input. Deterministic for a given token sequence.
pub fn count_frequencies<I, S>(tokens: I, max_words: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    for (idx, token) in tokens.into_iter().enumerate() {
        let entry = counts
            .entry(token.as_ref().to_string())
            .or_insert((0, idx));
        entry.0 += 1;
    }

    let mut entries: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries.truncate(max_words);

    entries
        .into_iter()
        .map(|(word, count, _)| WordCount { word, count })
        .collect()
}
