//! Error kinds for the chat orchestration core.
//!
//! The `Display` form of every variant is the user-facing French message;
//! internal detail goes to the log, never to the client.

use crate::prompt::{MAX_TURNS, MIN_TURNS};
use thiserror::Error;

/// Everything that can go wrong while handling one chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Nom du joueur invalide.")]
    InvalidPlayerName,

    #[error("Thème '{0}' invalide.")]
    InvalidTheme(String),

    #[error("Nombre de tours invalide (doit être entre {MIN_TURNS} et {MAX_TURNS}).")]
    InvalidTurnCount,

    #[error("Message utilisateur manquant.")]
    MissingMessage,

    #[error("Historique manquant.")]
    MissingHistory,

    #[error("Requête invalide : contexte manquant.")]
    NoContext,

    #[error("Message bloqué par sécurité.")]
    ModelBlocked,

    #[error("Génération IA interrompue.")]
    ModelInterrupted,

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ChatError {
    /// Classify a model-layer failure into a user-facing message by scanning
    /// the failure text for known substrings.
    pub fn from_model_error(error: &gemini::Error) -> Self {
        match error {
            gemini::Error::NoApiKey => {
                ChatError::Unexpected("Erreur d'authentification auprès du service IA.".to_string())
            }
            gemini::Error::Api { message, .. } => classify_unexpected(message),
            gemini::Error::Network(detail) => classify_unexpected(detail),
            gemini::Error::Parse(_) | gemini::Error::Config(_) => {
                ChatError::Unexpected("Erreur interne du serveur.".to_string())
            }
        }
    }
}

/// Map an arbitrary failure text to the closest user-facing message.
pub fn classify_unexpected(detail: &str) -> ChatError {
    let lower = detail.to_lowercase();
    let message = if lower.contains("api key") || lower.contains("unauthenticated") {
        "Erreur d'authentification auprès du service IA."
    } else if lower.contains("model not found") || lower.contains("is not supported") {
        "Modèle IA indisponible."
    } else if lower.contains("deadline exceeded")
        || lower.contains("timeout")
        || lower.contains("timed out")
    {
        "Délai d'attente du service IA dépassé."
    } else if lower.contains("resource exhausted") || lower.contains("quota") {
        "Quota du service IA atteint."
    } else {
        "Erreur interne du serveur."
    };
    ChatError::Unexpected(message.to_string())
}
