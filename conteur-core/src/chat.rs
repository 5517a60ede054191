//! Session orchestration.
//!
//! One incoming request is classified as starting a new adventure,
//! continuing an existing one, or carrying no usable context; the
//! orchestrator then sequences prompt assembly or pacing, the single
//! blocking model call, reply normalization, transcript translation, and
//! the persistence write.

use crate::catalog::ThemeCatalog;
use crate::error::ChatError;
use crate::model::NarratorModel;
use crate::pacing::{annotate, pacing_reminder};
use crate::prompt::assemble_opening;
use crate::reply::normalize_reply;
use crate::store::{NewSession, SessionId, SessionStore};
use crate::transcript::{from_model_history, to_model_history, ChatMessage, IncomingMessage};
use gemini::{Content, Response, Role};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// The request payload for one chat turn. New-game fields and
/// session-continuation fields are both optional; classification decides
/// which set is in effect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,

    /// `None` only when the client explicitly sent a null history.
    #[serde(default = "default_history")]
    pub history: Option<Vec<IncomingMessage>>,

    #[serde(default)]
    pub theme: Option<String>,

    #[serde(default)]
    pub age_group: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub player_name: Option<String>,

    /// Left loosely typed so a non-integer value fails validation, not
    /// deserialization.
    #[serde(default)]
    pub turn_count: Option<Value>,

    #[serde(default, rename = "session_id")]
    pub session_id: Option<String>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            message: None,
            history: default_history(),
            theme: None,
            age_group: None,
            gender: None,
            player_name: None,
            turn_count: None,
            session_id: None,
        }
    }
}

fn default_history() -> Option<Vec<IncomingMessage>> {
    Some(Vec::new())
}

/// A successful chat turn.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnReply {
    /// The narrator's reply for display.
    pub reply: String,

    /// The full updated client-visible transcript.
    pub history: Vec<ChatMessage>,

    /// The session this turn belongs to (freshly created when starting).
    pub session_id: SessionId,
}

/// A failed chat turn. The caller-supplied history and session id are
/// echoed unchanged so the client can retry without losing state.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct TurnFailure {
    pub error: ChatError,
    pub history: Vec<IncomingMessage>,
    pub session_id: Option<String>,
}

/// How a request is to be handled.
enum TurnKind<'a> {
    Starting,
    Continuing(&'a str),
    NoContext,
}

/// The conversation orchestrator.
pub struct ChatService<M, S> {
    model: M,
    store: S,
    catalog: ThemeCatalog,
}

impl<M: NarratorModel, S: SessionStore> ChatService<M, S> {
    /// Create a service over the built-in theme catalog.
    pub fn new(model: M, store: S) -> Self {
        Self {
            model,
            store,
            catalog: ThemeCatalog::builtin().clone(),
        }
    }

    /// Replace the theme catalog.
    pub fn with_catalog(mut self, catalog: ThemeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Handle one chat turn end to end.
    pub async fn handle_turn(&self, request: ChatRequest) -> Result<TurnReply, TurnFailure> {
        match self.dispatch(&request).await {
            Ok(reply) => Ok(reply),
            Err(error) => {
                warn!(%error, "chat turn failed");
                Err(TurnFailure {
                    error,
                    history: request.history.clone().unwrap_or_default(),
                    session_id: request.session_id.clone(),
                })
            }
        }
    }

    async fn dispatch(&self, request: &ChatRequest) -> Result<TurnReply, ChatError> {
        match classify(request) {
            TurnKind::Continuing(session_id) => self.continue_adventure(session_id, request).await,
            TurnKind::Starting => self.start_adventure(request).await,
            TurnKind::NoContext => Err(ChatError::NoContext),
        }
    }

    /// Start a new adventure: assemble the opening prompt, send it as the
    /// sole message, persist the resulting session.
    async fn start_adventure(&self, request: &ChatRequest) -> Result<TurnReply, ChatError> {
        let theme = present(&request.theme).unwrap_or_default();
        let age_group = present(&request.age_group).unwrap_or_default();
        let gender = present(&request.gender).unwrap_or_default();
        let player_name = present(&request.player_name).unwrap_or_default();
        let turn_count = request.turn_count.as_ref().and_then(coerce_turn_count);

        let opening = assemble_opening(
            &self.catalog,
            theme,
            age_group,
            gender,
            player_name,
            turn_count,
        )?;
        debug!(theme, target = opening.target_turns, "starting new adventure");

        let contents = vec![Content::user(opening.prompt)];
        let response = self.call_model(contents.clone()).await?;
        let reply = normalize_reply(&response);

        let transcript = post_call_transcript(contents, &response, &reply);
        let history = from_model_history(&transcript);

        let session_id = self
            .store
            .create(NewSession {
                player_name: opening.player_name,
                theme: theme.to_string(),
                age_group: age_group.to_string(),
                gender: gender.to_string(),
                target_turns: opening.target_turns,
                history: history.clone(),
            })
            .await
            .map_err(|e| {
                // The model call already happened and cannot be undone;
                // without a session id there is nothing to hand back.
                warn!(error = %e, "session creation failed after model call");
                ChatError::Persistence("Erreur lors de la création de la session.".to_string())
            })?;

        Ok(TurnReply {
            reply,
            history,
            session_id,
        })
    }

    /// Continue an existing adventure: translate the client transcript,
    /// pace, call the model, persist the updated transcript.
    async fn continue_adventure(
        &self,
        session_id: &str,
        request: &ChatRequest,
    ) -> Result<TurnReply, ChatError> {
        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(ChatError::MissingMessage)?;
        let history = request.history.as_ref().ok_or(ChatError::MissingHistory)?;

        let mut contents = to_model_history(history);
        let narrator_turns = contents.iter().filter(|c| c.role == Role::Model).count();

        // A missing or unreadable session disables pacing for this call
        // but never fails it.
        let target_turns = match self.store.get(session_id).await {
            Ok(Some(record)) => Some(record.target_turns),
            Ok(None) => {
                warn!(%session_id, "session not found; pacing disabled for this turn");
                None
            }
            Err(error) => {
                warn!(%session_id, %error, "session unreadable; pacing disabled for this turn");
                None
            }
        };

        let reminder = pacing_reminder(narrator_turns, target_turns);
        debug!(%session_id, narrator_turns, ?target_turns, paced = reminder.is_some(), "continuing adventure");
        contents.push(Content::user(annotate(message, reminder.as_deref())));

        let response = self.call_model(contents.clone()).await?;
        let reply = normalize_reply(&response);

        let transcript = post_call_transcript(contents, &response, &reply);
        let history = from_model_history(&transcript);

        // The reply is already in hand; a failed write loses durability,
        // not the turn.
        if let Err(error) = self.store.update_history(session_id, &history).await {
            warn!(%session_id, %error, "failed to persist updated transcript");
        }

        Ok(TurnReply {
            reply,
            history,
            session_id: session_id.to_string(),
        })
    }

    /// Make the single blocking model call, screening responses that carry
    /// no candidate to normalize.
    async fn call_model(&self, contents: Vec<Content>) -> Result<Response, ChatError> {
        let response = self
            .model
            .narrate(contents)
            .await
            .map_err(|e| ChatError::from_model_error(&e))?;

        if response.prompt_blocked() {
            warn!("prompt rejected upstream");
            return Err(ChatError::ModelBlocked);
        }
        if response.candidates.is_empty() {
            warn!("model returned no candidates");
            return Err(ChatError::ModelInterrupted);
        }
        Ok(response)
    }
}

/// The classification predicate: a session id wins over new-game fields;
/// a complete set of new-game fields starts an adventure; anything else is
/// unusable.
fn classify(request: &ChatRequest) -> TurnKind<'_> {
    if let Some(session_id) = present(&request.session_id) {
        return TurnKind::Continuing(session_id);
    }

    let has_new_game_fields = present(&request.theme).is_some()
        && present(&request.age_group).is_some()
        && present(&request.gender).is_some()
        && present(&request.player_name).is_some()
        && request
            .turn_count
            .as_ref()
            .map(|v| !v.is_null())
            .unwrap_or(false);

    if has_new_game_fields {
        TurnKind::Starting
    } else {
        TurnKind::NoContext
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Accept integers and integer-valued strings; anything else is invalid.
fn coerce_turn_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The authoritative post-call transcript: what was sent, plus the model's
/// reply. A candidate with no text is represented by the normalized
/// placeholder so the client transcript stays complete.
fn post_call_transcript(sent: Vec<Content>, response: &Response, reply: &str) -> Vec<Content> {
    let mut transcript = sent;
    let candidate_content = response
        .candidates
        .first()
        .and_then(|c| c.content.clone())
        .filter(|content| content.text().is_some());
    transcript.push(candidate_content.unwrap_or_else(|| Content::model(reply)));
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_session_id_takes_precedence() {
        let request = ChatRequest {
            session_id: Some("abc".to_string()),
            theme: Some("Fantasy Médiévale".to_string()),
            age_group: Some("Adulte".to_string()),
            gender: Some("Garçon".to_string()),
            player_name: Some("Max".to_string()),
            turn_count: Some(Value::from(12)),
            ..Default::default()
        };
        assert!(matches!(classify(&request), TurnKind::Continuing("abc")));
    }

    #[test]
    fn test_classify_starting() {
        let request = ChatRequest {
            theme: Some("Fantasy Médiévale".to_string()),
            age_group: Some("Adulte".to_string()),
            gender: Some("Garçon".to_string()),
            player_name: Some("Max".to_string()),
            turn_count: Some(Value::from(12)),
            ..Default::default()
        };
        assert!(matches!(classify(&request), TurnKind::Starting));
    }

    #[test]
    fn test_classify_no_context() {
        assert!(matches!(
            classify(&ChatRequest::default()),
            TurnKind::NoContext
        ));

        // An incomplete new-game field set is no context either.
        let request = ChatRequest {
            theme: Some("Fantasy Médiévale".to_string()),
            player_name: Some("Max".to_string()),
            ..Default::default()
        };
        assert!(matches!(classify(&request), TurnKind::NoContext));

        // A null turn count does not count as present.
        let request = ChatRequest {
            theme: Some("Fantasy Médiévale".to_string()),
            age_group: Some("Adulte".to_string()),
            gender: Some("Garçon".to_string()),
            player_name: Some("Max".to_string()),
            turn_count: Some(Value::Null),
            ..Default::default()
        };
        assert!(matches!(classify(&request), TurnKind::NoContext));
    }

    #[test]
    fn test_coerce_turn_count() {
        assert_eq!(coerce_turn_count(&Value::from(12)), Some(12));
        assert_eq!(coerce_turn_count(&Value::from("15")), Some(15));
        assert_eq!(coerce_turn_count(&Value::from(12.5)), None);
        assert_eq!(coerce_turn_count(&Value::from("douze")), None);
        assert_eq!(coerce_turn_count(&Value::Bool(true)), None);
    }

    #[test]
    fn test_request_deserialization() {
        let request: ChatRequest = serde_json::from_str(
            r#"{
                "message": "je commence",
                "theme": "Fantasy Médiévale",
                "ageGroup": "Adulte",
                "gender": "Garçon",
                "playerName": "Max",
                "turnCount": 12
            }"#,
        )
        .unwrap();

        assert_eq!(request.message.as_deref(), Some("je commence"));
        assert_eq!(request.age_group.as_deref(), Some("Adulte"));
        // An absent history deserializes as an empty transcript, not null.
        assert_eq!(request.history.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_null_history_is_preserved() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"session_id": "abc", "history": null}"#).unwrap();
        assert!(request.history.is_none());
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }
}
