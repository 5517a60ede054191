//! Client transcript representation and model-call translation.
//!
//! The client-visible transcript speaks `player` / `narrator`; the model
//! layer speaks `user` / `model`. Translation is lenient in both directions:
//! a malformed individual entry is dropped with a logged warning, never an
//! error.

use crate::pacing::REMINDER_MARKER;
use gemini::{Content, Part, Role};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Role of a client-visible transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Player,
    Narrator,
}

/// One canonical client-visible transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn player(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Player,
            content: content.into(),
        }
    }

    pub fn narrator(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Narrator,
            content: content.into(),
        }
    }
}

/// A transcript entry as received at the boundary. Clients send whatever
/// they have; both fields are optional so one bad entry never rejects the
/// whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl IncomingMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(content.into()),
        }
    }
}

/// Translate a client transcript into model-call contents.
///
/// Entries with a missing role or missing content are dropped with a
/// warning. A present role other than `player` maps to the model side.
pub fn to_model_history(entries: &[IncomingMessage]) -> Vec<Content> {
    entries
        .iter()
        .filter_map(|entry| match (&entry.role, &entry.content) {
            (Some(role), Some(content)) => {
                let role = if role == "player" {
                    Role::User
                } else {
                    Role::Model
                };
                Some(Content {
                    role,
                    parts: vec![Part::text(content)],
                })
            }
            _ => {
                warn!(?entry, "dropping malformed history entry");
                None
            }
        })
        .collect()
}

/// Translate the model layer's post-call transcript back into client form.
///
/// Pacing reminders are stripped so the stored and displayed transcript
/// always shows the unannotated utterance. Entries with no extractable text
/// are dropped with a warning.
pub fn from_model_history(contents: &[Content]) -> Vec<ChatMessage> {
    contents
        .iter()
        .filter_map(|content| {
            let Some(text) = content.parts.iter().find_map(|p| p.text.as_deref()) else {
                warn!(role = ?content.role, "dropping model entry with no text");
                return None;
            };
            let role = match content.role {
                Role::User => ChatRole::Player,
                Role::Model => ChatRole::Narrator,
            };
            Some(ChatMessage {
                role,
                content: strip_reminder(text).to_string(),
            })
        })
        .collect()
}

/// Remove a pacing reminder prefix, if present, through its blank-line
/// separator.
pub fn strip_reminder(content: &str) -> &str {
    if content.starts_with(REMINDER_MARKER) {
        if let Some(idx) = content.find("\n\n") {
            return &content[idx + 2..];
        }
    }
    content
}

/// Extract the text of choice `letter` from the most recent narrator entry.
///
/// Narrator replies present choices as `A) ...` lines; this finds the line
/// for the given letter in the latest narrator entry only. Returns `None`
/// when that entry offers no such choice.
pub fn extract_choice_text(letter: char, history: &[ChatMessage]) -> Option<String> {
    let last_narrator = history.iter().rev().find(|m| m.role == ChatRole::Narrator)?;
    let pattern = format!(r"(?mi)^\s*{}\)\s*(.*?)\s*$", regex::escape(&letter.to_string()));
    let re = Regex::new(&pattern).ok()?;
    let text = re.captures(&last_narrator.content)?.get(1)?.as_str().trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
