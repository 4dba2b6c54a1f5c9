use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::screening::models::SessionState;

/// One session, locked for the duration of an action so two requests for the same
/// candidate never interleave. Other sessions are unaffected.
pub type SessionSlot = Arc<Mutex<SessionState>>;

/// In-memory map of live sessions. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
}

impl SessionStore {
    /// Starts a new session in `Intake` and returns a snapshot of it.
    pub async fn create(&self) -> SessionState {
        let state = SessionState::new();
        self.sessions
            .write()
            .await
            .insert(state.id, Arc::new(Mutex::new(state.clone())));
        state
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionSlot> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drops the session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions whose last action is older than `max_idle`. Sessions locked by a
    /// request are kept. A `Generating` session older than `max_idle` was abandoned by
    /// its request, since the model call is bounded by the client timeout.
    /// Returns how many were removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(max_idle) else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => session.updated_at >= cutoff,
            Err(_) => true,
        });
        before - sessions.len()
    }
}
