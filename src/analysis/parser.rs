use serde::de::DeserializeOwned;

use crate::domain::verdict::{AnalysisVerdict, IssueDraft, SecretLeakVerdict};

/// Marker the generation service embeds in its output when the prompt
/// exceeded the model's input window. Matched as a plain substring.
pub const CONTEXT_WINDOW_MARKER: &str = "ContextWindowExceededError";

/// Shape the aggregated text is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    ChangelogSuggestion,
    SecretLeak,
    // Decoded for callers that open issues; no workflow requests it yet.
    #[cfg_attr(not(test), allow(dead_code))]
    IssueCreation,
}

/// Decodes aggregated text. Never fails: text that does not match the
/// expected shape becomes [`AnalysisVerdict::Unparseable`].
pub fn parse_response(text: &str, shape: ResponseShape) -> AnalysisVerdict {
    match shape {
        ResponseShape::ChangelogSuggestion => AnalysisVerdict::ChangelogSuggestion {
            text: text.to_string(),
        },
        ResponseShape::SecretLeak => decode::<SecretLeakVerdict>(text, AnalysisVerdict::SecretLeak),
        ResponseShape::IssueCreation => decode::<IssueDraft>(text, AnalysisVerdict::IssueCreation),
    }
}

fn decode<T: DeserializeOwned>(text: &str, wrap: fn(T) -> AnalysisVerdict) -> AnalysisVerdict {
    match serde_json::from_str::<T>(text.trim()) {
        Ok(value) => wrap(value),
        Err(err) => AnalysisVerdict::Unparseable {
            raw: text.to_string(),
            reason: err.to_string(),
        },
    }
}

/// Whether raw generation output reports an oversized prompt.
pub fn exceeds_context_window(raw: &str) -> bool {
    raw.contains(CONTEXT_WINDOW_MARKER)
}
