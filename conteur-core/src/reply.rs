//! Narrator reply normalization.
//!
//! A model response is not guaranteed to carry usable text: candidates can
//! be safety-filtered, truncated, or structurally empty. Normalization runs
//! an ordered list of extraction strategies, first success wins, and always
//! produces some display string.

use gemini::{FinishReason, Response};

/// Placeholder shown when a candidate was safety-filtered.
pub const BLOCKED_SAFETY: &str = "[Contenu bloqué par sécurité]";

/// Placeholder shown when a candidate was flagged as recitation.
pub const BLOCKED_RECITATION: &str = "[Contenu bloqué (récitation)]";

/// Placeholder shown when generation hit the output token limit.
pub const TRUNCATED: &str = "[Réponse coupée : trop longue]";

/// Placeholder shown for an unusable candidate with no known cause.
pub const RECEIVE_ERROR: &str = "[Erreur réception réponse IA]";

/// Placeholder shown when the response has no candidate to inspect at all.
pub const INTERNAL_ERROR: &str = "[Erreur interne traitement réponse IA]";

type Strategy = fn(&Response) -> Option<String>;

/// Extraction strategies, tried in order.
const STRATEGIES: &[Strategy] = &[direct_text, joined_parts, finish_reason_placeholder];

/// Reduce a model response to one display string. Never fails.
pub fn normalize_reply(response: &Response) -> String {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(response))
        .unwrap_or_else(|| INTERNAL_ERROR.to_string())
}

/// First candidate's first text part, when non-empty.
fn direct_text(response: &Response) -> Option<String> {
    response
        .text()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// All text parts of the first candidate, space-joined, when non-empty.
fn joined_parts(response: &Response) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let joined = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Placeholder derived from the first candidate's finish reason.
fn finish_reason_placeholder(response: &Response) -> Option<String> {
    let candidate = response.candidates.first()?;
    let placeholder = match candidate.finish_reason {
        Some(FinishReason::Safety) => BLOCKED_SAFETY,
        Some(FinishReason::Recitation) => BLOCKED_RECITATION,
        Some(FinishReason::MaxTokens) => TRUNCATED,
        _ => RECEIVE_ERROR,
    };
    Some(placeholder.to_string())
}
