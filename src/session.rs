//! Client-held identity, made explicit.
//!
//! A [`Session`] is issued at login and passed to every request handler;
//! services treat it as a claim and re-check the live user record before
//! anything privileged. The [`SessionStore`] persists one serialized blob
//! so a restart resumes the login, and drops it on any parse failure.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Rank, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub rank: Rank,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            rank: user.rank,
            issued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the persisted session, if any. A blob that fails to parse is
    /// deleted and treated as no session.
    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => {
                debug!(path = %self.path.display(), "Restored session");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session blob");
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        let raw = serde_json::to_string(session)?;
        fs::write(&self.path, raw)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static NEXT: AtomicU32 = AtomicU32::new(0);

    fn scratch_store() -> SessionStore {
        let n = NEXT.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "coalshop-session-{}-{n}.json",
            std::process::id()
        ));
        SessionStore::new(path)
    }

    #[test]
    fn save_load_clear_cycle() {
        let store = scratch_store();
        let user = User::new("alice", "alice@example.com", "hunter42");
        let session = Session::issue(&user);

        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn garbage_blob_is_dropped_on_load() {
        let store = scratch_store();
        fs::write(&store.path, "{not json").unwrap();
        assert_eq!(store.load(), None);
        // The broken file is gone afterwards.
        assert!(!store.path.exists());
    }
}
