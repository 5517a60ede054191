//! Theme-driven interactive fiction engine with an AI narrator.
//!
//! This crate provides:
//! - Turn-based adventure orchestration over a Gemini-backed narrator
//! - A French theme and instruction catalog for the opening prompt
//! - Turn pacing toward a per-session target length
//! - Resumable session persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use conteur_core::{ChatRequest, ChatService, FileSessionStore, GeminiNarrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ChatService::new(
//!         GeminiNarrator::from_env()?,
//!         FileSessionStore::new("sessions"),
//!     );
//!
//!     let reply = service
//!         .handle_turn(ChatRequest {
//!             theme: Some("Fantasy Médiévale".to_string()),
//!             age_group: Some("Adulte".to_string()),
//!             gender: Some("Garçon".to_string()),
//!             player_name: Some("Max".to_string()),
//!             turn_count: Some(12.into()),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("{}", reply.reply);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod chat;
pub mod error;
pub mod model;
pub mod pacing;
pub mod prompt;
pub mod reply;
pub mod store;
pub mod testing;
pub mod transcript;

// Primary public API
pub use catalog::{Theme, ThemeCatalog};
pub use chat::{ChatRequest, ChatService, TurnFailure, TurnReply};
pub use error::ChatError;
pub use model::{GeminiNarrator, NarratorConfig, NarratorModel};
pub use prompt::{MAX_TURNS, MIN_TURNS};
pub use store::{
    FileSessionStore, NewSession, SessionId, SessionRecord, SessionStore, SessionSummary,
    StoreError,
};
pub use testing::MockNarrator;
pub use transcript::{ChatMessage, ChatRole, IncomingMessage};
