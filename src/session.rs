//! Per-user conversation sessions.
//!
//! A session remembers the last submitted URL, the resolved title and the
//! tier selection in flight. Storage is an explicit store injected into the
//! handlers instead of a bare global map: entries expire after a TTL and a
//! background task sweeps them out.
//!
//! Concurrency: every mutation goes through the sharded map's entry API, so
//! a single update is atomic per user. Telegram delivers one update per
//! chat at a time, and no lock is ever held across an `.await`, which keeps
//! the single-writer property without an explicit per-user mutex. A
//! deployment that fans out parallel handlers per chat would need to
//! serialize through [`SessionStore::begin_download`]-style atomic ops for
//! every compound access, as the tier flow already does.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use teloxide::types::ChatId;
use url::Url;

use crate::core::config;
use crate::download::QualityTier;

/// One user's conversational state. Lost on restart by design.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub last_url: Option<Url>,
    pub video_title: Option<String>,
    pub pending_tier: Option<QualityTier>,
    touched_at: Instant,
}

impl UserSession {
    fn new() -> Self {
        UserSession {
            last_url: None,
            video_title: None,
            pending_tier: None,
            touched_at: Instant::now(),
        }
    }
}

/// Process-wide session store keyed by chat, with TTL eviction.
pub struct SessionStore {
    sessions: DashMap<ChatId, UserSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(config::session::ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        SessionStore {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Runs `f` against the user's session (created on first touch),
    /// atomically for this key, and refreshes its TTL.
    pub fn update<R>(&self, chat_id: ChatId, f: impl FnOnce(&mut UserSession) -> R) -> R {
        let mut entry = self.sessions.entry(chat_id).or_insert_with(UserSession::new);
        entry.touched_at = Instant::now();
        f(entry.value_mut())
    }

    /// Snapshot of the user's session, or `None` if absent or expired.
    pub fn get(&self, chat_id: ChatId) -> Option<UserSession> {
        let entry = self.sessions.get(&chat_id)?;
        if entry.touched_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.clone())
    }

    /// Stores a freshly submitted URL, clearing any stale title/selection.
    /// Later submissions overwrite earlier ones; there is no history.
    pub fn store_url(&self, chat_id: ChatId, url: Url) {
        self.update(chat_id, |s| {
            s.last_url = Some(url);
            s.video_title = None;
            s.pending_tier = None;
        });
    }

    /// Records the resolved title for the stored URL.
    pub fn store_title(&self, chat_id: ChatId, title: String) {
        self.update(chat_id, |s| s.video_title = Some(title));
    }

    /// Atomically claims the stored URL for a download at `tier`.
    ///
    /// Returns the URL and title in one step so a racing second selection
    /// cannot interleave between the read and the pending-tier stamp.
    /// `None` when no URL is stored (session lost or never primed).
    pub fn begin_download(&self, chat_id: ChatId, tier: QualityTier) -> Option<(Url, Option<String>)> {
        let mut entry = self.sessions.entry(chat_id).or_insert_with(UserSession::new);
        entry.touched_at = Instant::now();

        let url = entry.last_url.clone()?;
        entry.pending_tier = Some(tier);
        Some((url, entry.video_title.clone()))
    }

    /// Marks the in-flight download finished. The URL stays stored so the
    /// user can immediately retry another tier.
    pub fn finish_download(&self, chat_id: ChatId) {
        self.update(chat_id, |s| s.pending_tier = None);
    }

    /// Drops the user's session entirely (the `/cancel` path).
    pub fn clear(&self, chat_id: ChatId) {
        self.sessions.remove(&chat_id);
    }

    /// Removes every expired session; returns how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, s| s.touched_at.elapsed() <= ttl);
        before - self.sessions.len()
    }

    /// Spawns the periodic eviction sweep.
    pub fn spawn_eviction_task(self: Arc<Self>, interval: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = self.evict_expired();
                if evicted > 0 {
                    log::debug!("evicted {} expired session(s)", evicted);
                }
            }
        });
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

    fn chat(n: i64) -> ChatId {
        ChatId(n)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn fresh_chat_has_no_session() {
        let store = SessionStore::new();
        assert!(store.get(chat(1)).is_none());
    }

    #[test]
    fn store_url_overwrites_previous_state() {
        let store = SessionStore::new();
        let id = chat(1);

        store.store_url(id, url("https://example.com/a"));
        store.store_title(id, "First".to_string());

        store.store_url(id, url("https://example.com/b"));
        let session = store.get(id).unwrap();
        assert_eq!(session.last_url.unwrap().as_str(), "https://example.com/b");
        assert!(session.video_title.is_none());
        assert!(session.pending_tier.is_none());
    }

    #[test]
    fn begin_download_requires_a_stored_url() {
        let store = SessionStore::new();
        assert!(store.begin_download(chat(1), QualityTier::Best).is_none());
    }

    #[test]
    fn begin_download_claims_url_and_title() {
        let store = SessionStore::new();
        let id = chat(7);
        store.store_url(id, url("https://example.com/video"));
        store.store_title(id, "Demo".to_string());

        let (u, title) = store.begin_download(id, QualityTier::AudioOnly).unwrap();
        assert_eq!(u.as_str(), "https://example.com/video");
        assert_eq!(title.as_deref(), Some("Demo"));
        assert_eq!(store.get(id).unwrap().pending_tier, Some(QualityTier::AudioOnly));

        store.finish_download(id);
        let session = store.get(id).unwrap();
        assert!(session.pending_tier.is_none());
        // The URL survives so the user can retry a lower tier.
        assert!(session.last_url.is_some());
    }

    #[test]
    fn clear_removes_the_session() {
        let store = SessionStore::new();
        let id = chat(2);
        store.store_url(id, url("https://example.com/x"));
        store.clear(id);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn expired_sessions_are_invisible_and_evictable() {
        let store = SessionStore::with_ttl(Duration::from_millis(0));
        let id = chat(3);
        store.store_url(id, url("https://example.com/x"));

        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get(id).is_none());
        assert_eq!(store.evict_expired(), 1);
        assert_eq!(store.evict_expired(), 0);
    }
}
