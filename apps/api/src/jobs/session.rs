use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::models::{JobForm, TabularDataset};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// The last spreadsheet successfully parsed for a session.
#[derive(Debug, Clone)]
pub struct UploadedSheet {
    pub file_name: String,
    pub dataset: TabularDataset,
}

/// Everything a session has accumulated for its next generation call.
#[derive(Debug, Clone, Default)]
pub struct JobSession {
    /// Form submissions, in submission order. Stored raw; normalized at generation.
    pub forms: Vec<JobForm>,
    pub upload: Option<UploadedSheet>,
}

struct SessionEntry {
    session: JobSession,
    last_seen: Instant,
}

/// In-memory session buffers keyed by session id.
///
/// Nothing here outlives the process. A session idle for longer than `ttl` is
/// dropped, and once `max_sessions` are live the least recently used one makes
/// room for a new one. Generation works on a `snapshot`, so the lock is never
/// held while covers are rendered.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    max_sessions: usize,
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            ttl,
            max_sessions: max_sessions.max(1),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        if sessions.len() >= self.max_sessions {
            if let Some(victim) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            {
                sessions.remove(&victim);
                info!(
                    "Session {victim} evicted, limit of {} reached",
                    self.max_sessions
                );
            }
        }
        sessions.insert(
            id,
            SessionEntry {
                session: JobSession::default(),
                last_seen: Instant::now(),
            },
        );
        info!("Session {id} started");
        id
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        self.with_session(id, |_| ()).await.is_ok()
    }

    /// Appends a form submission. Returns the new buffer length.
    pub async fn append(&self, id: Uuid, form: JobForm) -> Result<usize, AppError> {
        if form.jobname.trim().is_empty() {
            return Err(AppError::Validation("jobname is required".to_string()));
        }
        self.with_session(id, |session| {
            session.forms.push(form);
            session.forms.len()
        })
        .await
    }

    pub async fn set_upload(&self, id: Uuid, upload: UploadedSheet) -> Result<(), AppError> {
        self.with_session(id, |session| session.upload = Some(upload)).await
    }

    pub async fn clear_upload(&self, id: Uuid) -> Result<(), AppError> {
        self.with_session(id, |session| session.upload = None).await
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<JobSession, AppError> {
        self.with_session(id, |session| session.clone()).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        sessions
            .remove(&id)
            .map(|_| info!("Session {id} ended"))
            .ok_or_else(|| not_found(id))
    }

    /// Runs `f` on a live session and marks it as used.
    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut JobSession) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        let entry = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        entry.last_seen = Instant::now();
        Ok(f(&mut entry.session))
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Expired {expired} idle session(s)");
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
