//! Wire-level data model for sessions, messages, and attachments.
//!
//! All timestamps are epoch milliseconds and all field names serialize in
//! camelCase, matching the JSON contract the client consumes.

use serde::{Deserialize, Serialize};

/// The ttl values a client may request, in seconds.
pub const TTL_OPTIONS: [i64; 3] = [600, 3600, 86400];

/// Fallback ttl (seconds) for any request outside [`TTL_OPTIONS`].
pub const DEFAULT_TTL: i64 = 3600;

/// Coerce a requested ttl onto the allow-list.
///
/// Any value outside [`TTL_OPTIONS`] silently falls back to [`DEFAULT_TTL`].
#[must_use]
pub fn coerce_ttl(requested: i64) -> i64 {
    if TTL_OPTIONS.contains(&requested) {
        requested
    } else {
        DEFAULT_TTL
    }
}

/// Coarse content classification for attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
    Text,
    Link,
}

/// A file or link attached to a message. Immutable, owned by one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Size in bytes.
    pub size: u64,
}

/// A received email. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: String,
    pub session_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Receipt time, epoch milliseconds.
    pub received_at: i64,
    pub attachments: Vec<Attachment>,
}

/// A temporary inbox identity with a bounded lifetime.
///
/// `expires_at` is always `created_at + ttl * 1000`. The message list is
/// ordered most-recent-first. A `Session` value is also the undo snapshot
/// format: `rotate` hands one back to the caller and `restore` accepts it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub email: String,
    /// Validity duration in seconds, one of [`TTL_OPTIONS`].
    pub ttl: i64,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Expiry time, epoch milliseconds.
    pub expires_at: i64,
    /// Free-form short display string chosen by the client.
    pub avatar: String,
    #[serde(default)]
    pub messages: Vec<EmailMessage>,
}
