//! Session Management
//!
//! Per-conversation-thread state: the append-only transcript, the routing
//! cursor and the turn counter. A session is owned by exactly one in-flight
//! turn at a time; the store hands out a per-thread lock to enforce that.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::routing::WorkerKind;

/// Where control goes next within a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextHop {
    Supervisor,
    Worker(WorkerKind),
    Finish,
}

/// State of one conversation thread
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// Opaque thread identifier supplied by the caller
    pub thread_id: String,

    /// Ordered transcript; append-only, never reordered or deleted
    pub messages: Vec<Message>,

    /// Routing cursor
    pub next_hop: NextHop,

    /// Router-invocation counter for the current turn; reset to zero each
    /// time a new user message is submitted
    pub turn_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(thread_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
            next_hop: NextHop::Supervisor,
            turn_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and touch the activity timestamp
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Whether this session is on its very first user message
    pub fn is_first_turn(&self) -> bool {
        self.messages.len() == 1
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Handle to a session guarded by a per-thread async lock
pub type SessionHandle = Arc<tokio::sync::Mutex<SessionState>>;

/// Session store keyed by thread id
pub trait SessionStore: Send + Sync {
    /// Get or create the session for a thread. Callers must hold the
    /// returned lock for the whole turn so turns for one thread never
    /// interleave.
    fn open(&self, thread_id: &str) -> SessionHandle;

    /// Drop a session
    fn remove(&self, thread_id: &str);

    /// Number of live sessions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory session store
pub struct MemorySessionStore {
    sessions: std::sync::Mutex<HashMap<String, SessionHandle>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::Mutex::new(HashMap::new()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn open(&self, thread_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(thread_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(SessionState::new(thread_id))))
            .clone()
    }

    fn remove(&self, thread_id: &str) {
        self.sessions.lock().unwrap().remove(thread_id);
    }

    fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}
