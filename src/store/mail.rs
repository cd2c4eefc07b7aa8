//! In-memory session and mailbox storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use super::compose;
use super::types::{coerce_ttl, EmailMessage, Session};

/// Avatar assigned to freshly created sessions.
pub const DEFAULT_AVATAR: &str = "🪄";

/// Internal session record. Messages live in their own map so that a
/// mailbox can be captured or discarded independently of the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionRecord {
    id: String,
    email: String,
    ttl: i64,
    created_at: i64,
    expires_at: i64,
    avatar: String,
}

impl SessionRecord {
    fn into_session(self, messages: Vec<EmailMessage>) -> Session {
        Session {
            id: self.id,
            email: self.email,
            ttl: self.ttl,
            created_at: self.created_at,
            expires_at: self.expires_at,
            avatar: self.avatar,
            messages,
        }
    }

    fn from_session(session: Session) -> (Self, Vec<EmailMessage>) {
        let record = Self {
            id: session.id,
            email: session.email,
            ttl: session.ttl,
            created_at: session.created_at,
            expires_at: session.expires_at,
            avatar: session.avatar,
        };
        (record, session.messages)
    }

    fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

/// Thread-safe store owning both key-value containers: sessions by id and
/// message lists by session id.
///
/// The store is injected into handlers through application state rather
/// than living as a module-level singleton. Lock ordering is sessions
/// before mailboxes. `append` keeps the sessions read guard held across
/// its mailbox insert so a concurrent `rotate` or sweep cannot remove the
/// session mid-append and leave a mailbox keyed by a dead id; every
/// mailbox key therefore has a matching session key.
#[derive(Debug, Clone)]
pub struct MailStore {
    inner: Arc<MailStoreInner>,
}

#[derive(Debug)]
struct MailStoreInner {
    domain: String,
    sessions: RwLock<HashMap<String, SessionRecord>>,
    mailboxes: RwLock<HashMap<String, Vec<EmailMessage>>>,
}

impl MailStore {
    /// Create an empty store issuing addresses under `domain`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MailStoreInner {
                domain: domain.into(),
                sessions: RwLock::new(HashMap::new()),
                mailboxes: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Allocate a new session with a fresh id and generated address.
    ///
    /// The requested ttl is coerced onto the allow-list; anything else
    /// falls back to one hour. Always succeeds.
    #[must_use]
    pub fn create(&self, requested_ttl: i64) -> Session {
        let ttl = coerce_ttl(requested_ttl);
        let now = Utc::now().timestamp_millis();
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            email: compose::generate_address(&self.inner.domain),
            ttl,
            created_at: now,
            expires_at: now + ttl * 1000,
            avatar: DEFAULT_AVATAR.to_string(),
        };

        let mut sessions = self.inner.sessions.write().unwrap();
        sessions.insert(record.id.clone(), record.clone());
        drop(sessions);

        let mut mailboxes = self.inner.mailboxes.write().unwrap();
        mailboxes.insert(record.id.clone(), Vec::new());
        drop(mailboxes);

        record.into_session(Vec::new())
    }

    /// Look up a session by id, with its messages. Does not mutate.
    ///
    /// A session past its `expires_at` counts as not found; the reaper
    /// removes it for real on the next sweep.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now().timestamp_millis();
        let sessions = self.inner.sessions.read().unwrap();
        let record = sessions.get(id)?;
        if record.is_expired(now) {
            return None;
        }
        let record = record.clone();
        drop(sessions);

        let messages = self
            .inner
            .mailboxes
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default();
        Some(record.into_session(messages))
    }

    /// Replace the session wholesale: capture the current session and its
    /// mailbox as a snapshot, then allocate a brand-new session.
    ///
    /// Rotating an unknown id still produces a fresh session; the old
    /// snapshot is simply `None`.
    #[must_use]
    pub fn rotate(&self, id: &str, requested_ttl: i64) -> (Option<Session>, Session) {
        let old_record = self.inner.sessions.write().unwrap().remove(id);
        let old_session = old_record.map(|record| {
            let messages = self
                .inner
                .mailboxes
                .write()
                .unwrap()
                .remove(id)
                .unwrap_or_default();
            record.into_session(messages)
        });

        let new_session = self.create(requested_ttl);
        (old_session, new_session)
    }

    /// Re-insert a previously captured snapshot verbatim, keyed by its
    /// original id, messages intact.
    #[must_use]
    pub fn restore(&self, snapshot: Session) -> Session {
        let (record, messages) = SessionRecord::from_session(snapshot);

        let mut sessions = self.inner.sessions.write().unwrap();
        sessions.insert(record.id.clone(), record.clone());
        drop(sessions);

        let mut mailboxes = self.inner.mailboxes.write().unwrap();
        mailboxes.insert(record.id.clone(), messages.clone());
        drop(mailboxes);

        record.into_session(messages)
    }

    /// Mutate the avatar of an existing session in place.
    #[must_use]
    pub fn update_avatar(&self, id: &str, avatar: &str) -> Option<Session> {
        let mut sessions = self.inner.sessions.write().unwrap();
        let record = sessions.get_mut(id)?;
        record.avatar = avatar.to_string();
        let record = record.clone();
        drop(sessions);

        let messages = self
            .inner
            .mailboxes
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default();
        Some(record.into_session(messages))
    }

    /// Synthesize one message for the session and prepend it to the
    /// mailbox (most-recent-first storage order).
    ///
    /// Returns `None` for unknown or expired sessions; other mailboxes are
    /// untouched either way.
    #[must_use]
    pub fn append(&self, id: &str) -> Option<EmailMessage> {
        let now = Utc::now().timestamp_millis();
        let sessions = self.inner.sessions.read().unwrap();
        let record = sessions.get(id)?;
        if record.is_expired(now) {
            return None;
        }
        let message = compose::synthesize(id, &record.email);

        // Keep `sessions` held so a rotate or sweep cannot delete the
        // session (and its mailbox) between the existence check above
        // and this insert.
        let mut mailboxes = self.inner.mailboxes.write().unwrap();
        mailboxes
            .entry(id.to_string())
            .or_default()
            .insert(0, message.clone());
        drop(mailboxes);
        drop(sessions);
        Some(message)
    }

    /// The ordered message list for a session, most recent first.
    /// Unknown or expired sessions yield an empty list.
    #[must_use]
    pub fn list(&self, id: &str) -> Vec<EmailMessage> {
        let now = Utc::now().timestamp_millis();
        let sessions = self.inner.sessions.read().unwrap();
        let live = sessions
            .get(id)
            .is_some_and(|record| !record.is_expired(now));
        drop(sessions);
        if !live {
            return Vec::new();
        }

        self.inner
            .mailboxes
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove every session past its expiry, returning the removed ids so
    /// the caller can publish `session:expired` per topic.
    pub fn sweep_expired(&self) -> Vec<String> {
        self.sweep_expired_at(Utc::now().timestamp_millis())
    }

    /// Sweep against an explicit clock reading.
    pub fn sweep_expired_at(&self, now_ms: i64) -> Vec<String> {
        let mut sessions = self.inner.sessions.write().unwrap();
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, record)| record.is_expired(now_ms))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        drop(sessions);

        let mut mailboxes = self.inner.mailboxes.write().unwrap();
        for id in &expired {
            mailboxes.remove(id);
        }
        expired
    }

    /// Number of stored sessions, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn mailbox_exists(&self, id: &str) -> bool {
        self.inner.mailboxes.read().unwrap().contains_key(id)
    }
}
