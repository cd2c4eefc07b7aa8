//! tempbox
//!
//! A disposable-email web service: clients get a temporary inbox with a
//! bounded lifetime, receive synthetic messages in real time over a
//! per-session push channel, and query a rule-based helper for summaries,
//! phishing hints, and username ideas.
//!
//! # Architecture
//!
//! - **Store**: one in-memory [`store::MailStore`] owning sessions and
//!   mailboxes, injected into handlers through [`AppState`]
//! - **Push channel**: per-session broadcast topics over WebSocket,
//!   at-most-once delivery
//! - **API**: thin axum handlers mapping JSON bodies onto store calls
//! - **Helper**: deterministic string analysis, no model involved
//!
//! # Modules
//!
//! - [`store`]: session lifecycle (create/rotate/restore/expire) and mail
//! - [`push`]: room-based publish hub
//! - [`api`]: HTTP boundary and the WebSocket endpoint
//! - [`helper`]: summaries, phishing scan, username ideas, speech seam

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod error;
pub mod helper;
pub mod push;
pub mod server;
pub mod store;

use std::sync::Arc;

use helper::SpeechCapability;
use push::PushHub;
use store::MailStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session and mailbox storage.
    pub store: MailStore,
    /// Per-session publish hub.
    pub push: PushHub,
    /// Voice capability for the helper; a no-op on headless hosts.
    pub speech: Arc<dyn SpeechCapability>,
}
