use crate::track::TrackList;
use axum::http::{HeaderMap, header};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "session_id";

/// How long a `/login` state value stays redeemable
pub const LOGIN_STATE_TTL: Duration = Duration::from_secs(600);

struct Session {
    tracks: Arc<TrackList>,
    created_at: Instant,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    /// OAuth `state` values handed out by `/login` and not yet used
    pending_logins: HashMap<String, Instant>,
}

/// In-memory session storage.
///
/// Each session owns the track list produced by its login; nothing outlives
/// the process.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
    ttl: Duration,
    login_ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            ttl,
            login_ttl: LOGIN_STATE_TTL.min(ttl),
        }
    }

    /// Override how long pending login states live (builder pattern)
    pub fn with_login_ttl(mut self, login_ttl: Duration) -> Self {
        self.login_ttl = login_ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_live(&self, created_at: Instant) -> bool {
        created_at.elapsed() < self.ttl
    }

    /// Issue a fresh OAuth `state` value
    pub async fn begin_login(&self) -> String {
        let state = uuid::Uuid::new_v4().simple().to_string();
        let mut inner = self.inner.write().await;
        inner
            .pending_logins
            .retain(|_, issued| issued.elapsed() < self.login_ttl);
        inner.pending_logins.insert(state.clone(), Instant::now());
        state
    }

    /// Consume a `state` value; false if it was never issued or has expired
    pub async fn complete_login(&self, state: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.pending_logins.remove(state) {
            Some(issued) => issued.elapsed() < self.login_ttl,
            None => false,
        }
    }

    /// Store a track list under a new session ID
    pub async fn create(&self, tracks: TrackList) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let mut inner = self.inner.write().await;
        inner.sessions.retain(|_, s| s.created_at.elapsed() < self.ttl);
        inner.sessions.insert(
            id.clone(),
            Session {
                tracks: Arc::new(tracks),
                created_at: Instant::now(),
            },
        );
        tracing::debug!("Created session {} ({} live)", id, inner.sessions.len());
        id
    }

    /// Track list of a live session
    pub async fn tracks(&self, id: &str) -> Option<Arc<TrackList>> {
        {
            let inner = self.inner.read().await;
            match inner.sessions.get(id) {
                None => return None,
                Some(session) if self.is_live(session.created_at) => {
                    return Some(session.tracks.clone());
                }
                Some(_) => {}
            }
        }

        tracing::debug!("Session {} expired", id);
        self.remove(id).await;
        None
    }

    /// Track list for the session named by the request's cookie, or an empty list
    pub async fn tracks_for(&self, headers: &HeaderMap) -> Arc<TrackList> {
        match session_id(headers) {
            Some(id) => self.tracks(&id).await.unwrap_or_default(),
            None => Arc::default(),
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.sessions.remove(id).is_some()
    }
}

/// Session ID from the request's `Cookie` headers
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a session
pub fn session_cookie(id: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        id,
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
