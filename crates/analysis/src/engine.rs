//! The analysis gateway: the synchronous engine interface the admission
//! layer dispatches into, and the built-in lexical implementation.
//!
//! The engine is deliberately opaque to the rest of the system: a
//! synchronous call that either returns a result or reports a failure.
//! Anything with that shape (an FFI-wrapped model runtime, a subprocess
//! bridge) can replace [`LexicalEngine`] without touching the pool or the
//! HTTP surface.

use std::collections::HashSet;

use serde_json::{json, Value};
use unicode_segmentation::UnicodeSegmentation;

use lexd_core::frequency::{count_frequencies, WordCount};
use lexd_core::tasks::AnalysisTask;

/// Error reported by an engine call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Processing failed: {0}")]
    Failed(String),
}

/// Parameters for a task-composition analysis call.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub text: String,
    /// Validated task selection (unknown names are rejected upstream).
    pub tasks: Vec<AnalysisTask>,
    /// Language hint. The built-in engine segments per UAX-29 and is
    /// language-agnostic; the hint exists for engines that are not.
    pub language: Option<String>,
    /// Effective stopword set, applied to `tok` output only.
    pub stopwords: HashSet<String>,
    /// Collapse duplicate tokens in `tok` output to their first
    /// occurrence.
    pub unique_tokens: bool,
}

/// Parameters for a word-frequency call.
#[derive(Debug, Clone)]
pub struct FrequencyRequest {
    pub text: String,
    pub max_words: usize,
    pub stopwords: HashSet<String>,
}

/// Output of a process call: task name -> task result.
pub type TaskOutput = serde_json::Map<String, Value>;

/// A synchronous analysis backend.
///
/// Calls may take arbitrarily long and are not guaranteed preemptible;
/// the admission pool runs them on blocking threads and abandons them at
/// the deadline.
pub trait AnalysisEngine: Send + Sync {
    fn process(&self, request: &ProcessRequest) -> Result<TaskOutput, EngineError>;

    fn word_frequency(&self, request: &FrequencyRequest)
        -> Result<Vec<WordCount>, EngineError>;
}

// ---------------------------------------------------------------------------
// Built-in engine
// ---------------------------------------------------------------------------

/// Deterministic lexical engine backed by UAX-29 word segmentation.
///
/// CJK ideographs segment per character, alphabetic scripts per word.
/// POS tags are coarse character-class categories; entity spans are
/// maximal runs of capitalized alphabetic tokens.
#[derive(Debug, Default)]
pub struct LexicalEngine;

impl LexicalEngine {
    pub fn new() -> Self {
        Self
    }

    fn tokenize(text: &str) -> Vec<&str> {
        text.unicode_words().collect()
    }

    /// Coarse part-of-speech category for one token.
    fn tag(token: &str) -> &'static str {
        if token.chars().all(|c| c.is_numeric()) {
            "NUM"
        } else if token.chars().all(is_han) {
            "HAN"
        } else if token.chars().all(char::is_alphabetic) {
            "ALPHA"
        } else {
            "OTHER"
        }
    }

    /// Maximal runs of capitalized alphabetic tokens as entity spans.
    ///
    /// Span bounds are token indices, end exclusive.
    fn entity_spans(tokens: &[&str]) -> Vec<Value> {
        let mut spans = Vec::new();
        let mut run_start: Option<usize> = None;

        for (idx, token) in tokens.iter().enumerate() {
            let capitalized = token
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase() && c.is_alphabetic());

            if capitalized {
                run_start.get_or_insert(idx);
            } else if let Some(start) = run_start.take() {
                spans.push(Self::span(tokens, start, idx));
            }
        }
        if let Some(start) = run_start {
            spans.push(Self::span(tokens, start, tokens.len()));
        }

        spans
    }

    fn span(tokens: &[&str], start: usize, end: usize) -> Value {
        json!({
            "text": tokens[start..end].join(" "),
            "label": "NE",
            "start": start,
            "end": end,
        })
    }

    fn filtered_tokens<'a>(tokens: &[&'a str], request: &ProcessRequest) -> Vec<&'a str> {
        let mut seen: HashSet<&str> = HashSet::new();
        tokens
            .iter()
            .filter(|t| !request.stopwords.contains(**t))
            .filter(|t| !request.unique_tokens || seen.insert(**t))
            .copied()
            .collect()
    }
}

impl AnalysisEngine for LexicalEngine {
    fn process(&self, request: &ProcessRequest) -> Result<TaskOutput, EngineError> {
        let tokens = Self::tokenize(&request.text);
        let mut output = TaskOutput::new();

        for task in &request.tasks {
            let value = match task {
                AnalysisTask::Tok => json!(Self::filtered_tokens(&tokens, request)),
                // Tags align index-for-index with the unfiltered tokens.
                AnalysisTask::Pos => {
                    json!(tokens.iter().map(|t| Self::tag(t)).collect::<Vec<_>>())
                }
                AnalysisTask::Ner => Value::Array(Self::entity_spans(&tokens)),
            };
            output.insert(task.name().to_string(), value);
        }

        Ok(output)
    }

    fn word_frequency(
        &self,
        request: &FrequencyRequest,
    ) -> Result<Vec<WordCount>, EngineError> {
        let tokens: Vec<&str> = Self::tokenize(&request.text)
            .into_iter()
            .filter(|t| !request.stopwords.contains(*t))
            .collect();

        Ok(count_frequencies(tokens, request.max_words))
    }
}

fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
    )
}
