use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::claims::Claims;

/// One authenticated console session. Claims are stored as validated at
/// login; subsequent requests trust them for the session's bounded
/// lifetime instead of re-verifying the original token.
#[derive(Debug, Clone)]
struct SessionEntry {
    claims: Claims,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session expired")]
    Expired,

    #[error("no such session")]
    NotFound,
}

/// In-memory store backing the admin-console session bridge.
///
/// The token is verified once at login; from then on each console request
/// rebuilds its request context from the stored claims until the idle or
/// absolute timeout ends the trust window.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn instance() -> &'static SessionStore {
        static INSTANCE: OnceLock<SessionStore> = OnceLock::new();
        INSTANCE.get_or_init(SessionStore::new)
    }

    /// Start an authenticated session for already-validated claims.
    pub async fn create(&self, claims: Claims) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let entry = SessionEntry {
            claims,
            created_at: now,
            last_seen: now,
        };
        self.sessions.write().await.insert(id, entry);
        tracing::debug!("console session {} started", id);
        id
    }

    /// Look up a session, enforce its timeouts, and touch its idle clock.
    ///
    /// An expired session is removed before the error is returned, so the
    /// caller transitions straight to logged-out.
    pub async fn resume(
        &self,
        id: Uuid,
        idle_timeout: Duration,
        absolute_timeout: Duration,
    ) -> Result<Claims, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;

        let now = Utc::now();
        if now - entry.last_seen > idle_timeout || now - entry.created_at > absolute_timeout {
            sessions.remove(&id);
            tracing::debug!("console session {} expired", id);
            return Err(SessionError::Expired);
        }

        entry.last_seen = now;
        Ok(entry.claims.clone())
    }

    /// Explicit logout. Removes all session state in one step; returns
    /// whether a session actually existed.
    pub async fn destroy(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!("console session {} destroyed", id);
        }
        removed
    }

    /// Drop every session past its timeouts. Housekeeping for long-running
    /// processes; resume() already enforces expiry on access.
    pub async fn purge_expired(&self, idle_timeout: Duration, absolute_timeout: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, e| {
            now - e.last_seen <= idle_timeout && now - e.created_at <= absolute_timeout
        });
        before - sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    fn test_claims() -> Claims {
        Claims {
            user_id: "u-1".to_string(),
            email: "admin@hospital.com".to_string(),
            tenant_id: "t-1".to_string(),
            tenant_slug: "hospital-one".to_string(),
            is_super_admin: false,
            permissions: StdHashMap::new(),
            enabled_modules: vec!["hms".to_string()],
            database_url: None,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn create_resume_roundtrip() {
        let store = SessionStore::new();
        let id = store.create(test_claims()).await;

        let claims = store
            .resume(id, Duration::minutes(30), Duration::hours(8))
            .await
            .unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.tenant_id, "t-1");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = SessionStore::new();
        let err = store
            .resume(Uuid::new_v4(), Duration::minutes(30), Duration::hours(8))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound);
    }

    #[tokio::test]
    async fn idle_timeout_expires_and_clears_session() {
        let store = SessionStore::new();
        let id = store.create(test_claims()).await;

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        let err = store
            .resume(id, Duration::milliseconds(10), Duration::hours(8))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Expired);

        // Expiry cleared the entry; the session is gone, not just stale
        let err = store
            .resume(id, Duration::hours(1), Duration::hours(8))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound);
    }

    #[tokio::test]
    async fn absolute_timeout_expires_active_session() {
        let store = SessionStore::new();
        let id = store.create(test_claims()).await;

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        // Still within idle window, but past the absolute bound
        let err = store
            .resume(id, Duration::hours(1), Duration::milliseconds(10))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Expired);
    }

    #[tokio::test]
    async fn logout_destroys_session() {
        let store = SessionStore::new();
        let id = store.create(test_claims()).await;

        assert!(store.destroy(id).await);
        assert!(!store.destroy(id).await);

        let err = store
            .resume(id, Duration::minutes(30), Duration::hours(8))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound);
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let store = SessionStore::new();
        let old = store.create(test_claims()).await;
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        let fresh = store.create(test_claims()).await;

        let purged = store
            .purge_expired(Duration::milliseconds(10), Duration::hours(8))
            .await;
        assert_eq!(purged, 1);

        assert!(store
            .resume(fresh, Duration::hours(1), Duration::hours(8))
            .await
            .is_ok());
        assert_eq!(
            store
                .resume(old, Duration::hours(1), Duration::hours(8))
                .await
                .unwrap_err(),
            SessionError::NotFound
        );
    }
}
