//! Session persistence.
//!
//! Sessions are resumable conversations keyed by an opaque id. The core
//! only depends on the [`SessionStore`] trait; [`FileSessionStore`] is the
//! shipped implementation, one versioned JSON document per session.
//!
//! Writes are last-write-wins: two racing continuations of the same session
//! can overwrite each other's transcript. The core assumes eventual, not
//! exclusive, durability.

use crate::transcript::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Current session document version.
const SESSION_VERSION: u32 = 1;

/// Opaque session identifier (uuid v4 in the file store).
pub type SessionId = String;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Everything needed to create a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub player_name: String,
    pub theme: String,
    pub age_group: String,
    pub gender: String,
    pub target_turns: i64,
    pub history: Vec<ChatMessage>,
}

/// A persisted session with all state needed to resume play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Document format version for compatibility checking.
    pub version: u32,

    pub id: SessionId,
    pub player_name: String,
    pub theme: String,
    pub age_group: String,
    pub gender: String,
    pub target_turns: i64,

    /// Unix seconds of the last exchange.
    pub last_played: u64,

    /// The canonical client-visible transcript.
    pub history: Vec<ChatMessage>,
}

/// Summary of a session for listing, without the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub player_name: String,
    pub theme: String,
    pub last_played: u64,
}

/// Storage collaborator for the orchestrator.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session, returning its fresh id.
    async fn create(&self, new_session: NewSession) -> Result<SessionId, StoreError>;

    /// Fetch a session. `Ok(None)` means the id is unknown.
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Replace a session's transcript and refresh its activity timestamp.
    async fn update_history(&self, id: &str, history: &[ChatMessage]) -> Result<(), StoreError>;

    /// Delete a session. `StoreError::NotFound` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Summaries of all sessions, most recently played first.
    async fn list(&self) -> Result<Vec<SessionSummary>, StoreError>;
}

/// File-backed session store: one JSON document per session.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// write or listing.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let content = match fs::read_to_string(self.session_path(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: SessionRecord = serde_json::from_str(&content)?;
        if record.version != SESSION_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SESSION_VERSION,
                found: record.version,
            });
        }
        Ok(Some(record))
    }

    async fn write(&self, record: &SessionRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.session_path(&record.id), content).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, new_session: NewSession) -> Result<SessionId, StoreError> {
        let record = SessionRecord {
            version: SESSION_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            player_name: new_session.player_name,
            theme: new_session.theme,
            age_group: new_session.age_group,
            gender: new_session.gender,
            target_turns: new_session.target_turns,
            last_played: unix_now(),
            history: new_session.history,
        };
        self.write(&record).await?;
        debug!(id = %record.id, theme = %record.theme, "session created");
        Ok(record.id)
    }

    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.load(id).await
    }

    async fn update_history(&self, id: &str, history: &[ChatMessage]) -> Result<(), StoreError> {
        let mut record = self.load(id).await?.ok_or(StoreError::NotFound)?;
        record.history = history.to_vec();
        record.last_played = unix_now();
        self.write(&record).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if !is_valid_id(id) {
            return Err(StoreError::NotFound);
        }
        match fs::remove_file(self.session_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await?;
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match peek_summary(&path).await {
                    Ok(summary) => summaries.push(summary),
                    Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable session file"),
                }
            }
        }

        summaries.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        Ok(summaries)
    }
}

/// Read a session file's summary without deserializing the transcript.
async fn peek_summary(path: &Path) -> Result<SessionSummary, StoreError> {
    let content = fs::read_to_string(path).await?;

    #[derive(Deserialize)]
    struct Partial {
        version: u32,
        id: SessionId,
        player_name: String,
        theme: String,
        last_played: u64,
    }

    let partial: Partial = serde_json::from_str(&content)?;

    if partial.version != SESSION_VERSION {
        return Err(StoreError::VersionMismatch {
            expected: SESSION_VERSION,
            found: partial.version,
        });
    }

    Ok(SessionSummary {
        id: partial.id,
        player_name: partial.player_name,
        theme: partial.theme,
        last_played: partial.last_played,
    })
}

/// Ids are uuid-shaped; anything else cannot name a session file.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
