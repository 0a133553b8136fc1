//! Chat sessions.
//!
//! A [`Session`] is an explicit value: an ordered, append-only list of
//! turns created when the browser connects and discarded with the process.
//! Displayed history is unbounded; only the engine's memory buffer bounds
//! what reaches the model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::types::{AppError, Message, MessageRole, Result};

/// One chat session's ordered turns.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub turns: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// In-memory registry of live sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty session and return its id.
    pub fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        self.sessions.write().insert(id, session);
        id
    }

    /// Whether a session exists.
    pub fn exists(&self, id: Uuid) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Append a turn to a session. Turns are only ever appended, never
    /// edited or reordered.
    pub fn append(&self, id: Uuid, role: MessageRole, content: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session '{}' not found", id)))?;
        session.turns.push(Message::new(role, content));
        Ok(())
    }

    /// Ordered history of a session.
    pub fn history(&self, id: Uuid) -> Result<Vec<Message>> {
        self.sessions
            .read()
            .get(&id)
            .map(|s| s.turns.clone())
            .ok_or_else(|| AppError::NotFound(format!("session '{}' not found", id)))
    }
}
