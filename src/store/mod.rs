//! Session and message storage.

pub mod compose;
mod mail;
mod types;

pub use mail::{MailStore, DEFAULT_AVATAR};
pub use types::{
    coerce_ttl, Attachment, AttachmentKind, EmailMessage, Session, DEFAULT_TTL, TTL_OPTIONS,
};
