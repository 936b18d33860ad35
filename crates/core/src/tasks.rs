//! The fixed vocabulary of analysis tasks and task-list resolution.
//!
//! Clients select work with a `tasks` list and may subtract from it with a
//! `skip_tasks` list. Both are validated against the enumerated vocabulary
//! up front; an unknown name is a validation error, never passed through to
//! the engine unchecked.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One analysis task the engine knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTask {
    /// Word segmentation.
    Tok,
    /// Coarse part-of-speech tagging.
    Pos,
    /// Named-entity span detection.
    Ner,
}

impl AnalysisTask {
    /// All known tasks, in canonical order.
    pub const ALL: [AnalysisTask; 3] = [AnalysisTask::Tok, AnalysisTask::Pos, AnalysisTask::Ner];

    /// The wire name of the task (used as the key in result maps).
    pub fn name(self) -> &'static str {
        match self {
            AnalysisTask::Tok => "tok",
            AnalysisTask::Pos => "pos",
            AnalysisTask::Ner => "ner",
        }
    }

    /// Parse a wire name. Unknown names are a validation error.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            "tok" => Ok(AnalysisTask::Tok),
            "pos" => Ok(AnalysisTask::Pos),
            "ner" => Ok(AnalysisTask::Ner),
            other => Err(CoreError::Validation(format!(
                "Unknown task: \"{other}\" (known tasks: tok, pos, ner)"
            ))),
        }
    }
}

/// Resolve the effective task list from optional `tasks` and `skip_tasks`
/// name lists.
///
/// - No `tasks` given: defaults to `[tok]`.
/// - `skip_tasks` entries are removed from the selection.
/// - Order follows the canonical task order, duplicates collapse.
/// - Any unknown name in either list is rejected.
pub fn resolve_tasks(
    tasks: Option<&[String]>,
    skip_tasks: Option<&[String]>,
) -> Result<Vec<AnalysisTask>, CoreError> {
    let selected: Vec<AnalysisTask> = match tasks {
        Some(names) => names
            .iter()
            .map(|n| AnalysisTask::parse(n.trim()))
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![AnalysisTask::Tok],
    };

    let skipped: Vec<AnalysisTask> = match skip_tasks {
        Some(names) => names
            .iter()
            .map(|n| AnalysisTask::parse(n.trim()))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let resolved: Vec<AnalysisTask> = AnalysisTask::ALL
        .into_iter()
        .filter(|t| selected.contains(t) && !skipped.contains(t))
        .collect();

    if resolved.is_empty() {
        return Err(CoreError::Validation(
            "No tasks left after applying skip_tasks".to_string(),
        ));
    }

    Ok(resolved)
}
