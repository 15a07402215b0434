use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as SessionLock;

use super::domain::SessionId;
use super::session::AssessmentSession;

/// Idle lifetime used when none is configured.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    session: Arc<SessionLock<AssessmentSession>>,
    last_touched: Instant,
}

/// Live sessions keyed by id. Each session sits behind its own async lock so a
/// respondent's requests run one at a time while other respondents proceed.
/// Sessions untouched for longer than the TTL are dropped.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Entry>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&self, session: AssessmentSession) -> SessionId {
        let now = Instant::now();
        let id = session.id().clone();
        let mut guard = self.sessions.lock().expect("session registry mutex poisoned");
        guard.retain(|_, entry| !self.is_expired(entry, now));
        guard.insert(
            id.clone(),
            Entry {
                session: Arc::new(SessionLock::new(session)),
                last_touched: now,
            },
        );
        id
    }

    /// Fetch a live session and refresh its idle timer.
    pub fn get(&self, id: &SessionId) -> Option<Arc<SessionLock<AssessmentSession>>> {
        let now = Instant::now();
        let mut guard = self.sessions.lock().expect("session registry mutex poisoned");
        let expired = self.is_expired(guard.get(id)?, now);
        if expired {
            guard.remove(id);
            return None;
        }
        let entry = guard.get_mut(id)?;
        entry.last_touched = now;
        Some(entry.session.clone())
    }

    /// Drop a session once the interaction ends.
    pub fn remove(&self, id: &SessionId) -> bool {
        let mut guard = self.sessions.lock().expect("session registry mutex poisoned");
        guard.remove(id).is_some()
    }

    /// Drop every session idle past the TTL as of `now`; returns how many went.
    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut guard = self.sessions.lock().expect("session registry mutex poisoned");
        let before = guard.len();
        guard.retain(|_, entry| !self.is_expired(entry, now));
        before - guard.len()
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_touched) > self.ttl
    }
}
