//! Per-user session registry
//!
//! Each user gets one session behind its own async mutex. Holding the lock for the whole
//! handling of an event serializes that user's events in arrival order while other users
//! proceed concurrently.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::state::{ConversationState, Session};

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the owner's session, creating an idle one on first contact
    pub async fn lock(&self, owner: &str, now: DateTime<Utc>) -> OwnedMutexGuard<Session> {
        let session = self
            .sessions
            .entry(owner.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(now))))
            .clone();
        session.lock_owned().await
    }

    /// Current state of a user's session, if one exists
    pub async fn state_of(&self, owner: &str) -> Option<ConversationState> {
        let session = self.sessions.get(owner).map(|s| s.clone())?;
        let state = session.lock().await.state;
        Some(state)
    }

    /// Reset sessions idle for longer than `timeout` and forget empty ones
    ///
    /// Sessions that are locked or referenced elsewhere are left for the next pass.
    /// Returns how many sessions had something in progress dropped.
    pub fn expire_idle(&self, now: DateTime<Utc>, timeout: Option<Duration>) -> usize {
        let mut expired = 0;
        self.sessions.retain(|_, session| {
            if Arc::strong_count(session) > 1 {
                return true;
            }
            let Ok(mut guard) = session.try_lock() else {
                return true;
            };
            if guard.expire_if_idle(now, timeout) {
                expired += 1;
            }
            !guard.is_empty()
        });
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::conversation::PendingDraft;
    use crate::features::items::ContentPayload;

    #[tokio::test]
    async fn test_lock_creates_idle_session() {
        let store = SessionStore::new();
        let now = Utc::now();
        {
            let session = store.lock("u1", now).await;
            assert_eq!(session.state, ConversationState::Idle);
        }
        assert_eq!(store.state_of("u1").await, Some(ConversationState::Idle));
        assert_eq!(store.state_of("u2").await, None);
    }

    #[tokio::test]
    async fn test_state_persists_between_locks() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.lock("u1", now).await.state = ConversationState::AwaitingContent;
        assert_eq!(
            store.lock("u1", now).await.state,
            ConversationState::AwaitingContent
        );
    }

    #[tokio::test]
    async fn test_expire_idle_resets_and_forgets() {
        let store = SessionStore::new();
        let start = Utc::now();
        {
            let mut session = store.lock("busy", start).await;
            session.state = ConversationState::AwaitingSubject;
            session.draft = Some(PendingDraft::new(ContentPayload::text("x"), start));
        }
        drop(store.lock("idle", start).await);
        {
            let mut fresh = store.lock("fresh", start).await;
            fresh.state = ConversationState::AwaitingContent;
            fresh.touch(start + Duration::minutes(50));
        }

        let expired = store.expire_idle(start + Duration::minutes(60), Some(Duration::minutes(30)));
        assert_eq!(expired, 1);
        // Expired and empty sessions are dropped, the active one stays
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.state_of("fresh").await,
            Some(ConversationState::AwaitingContent)
        );
    }

    #[tokio::test]
    async fn test_locked_session_is_not_swept() {
        let store = SessionStore::new();
        let start = Utc::now();
        let mut held = store.lock("u1", start).await;
        held.state = ConversationState::AwaitingContent;

        let expired = store.expire_idle(start + Duration::hours(2), Some(Duration::minutes(30)));
        assert_eq!(expired, 0);
        assert_eq!(store.len(), 1);
        assert_eq!(held.state, ConversationState::AwaitingContent);
    }

    #[tokio::test]
    async fn test_same_user_events_are_serialized() {
        let store = SessionStore::new();
        let now = Utc::now();
        let guard = store.lock("u1", now).await;

        let other = store.clone();
        let waiter = tokio::spawn(async move {
            let mut session = other.lock("u1", now).await;
            session.state = ConversationState::AwaitingSearchQuery;
        });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
        assert_eq!(
            store.state_of("u1").await,
            Some(ConversationState::AwaitingSearchQuery)
        );
    }
}
