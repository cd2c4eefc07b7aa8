//! Router assembly, background reaper, and the serve loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::helper::NullSpeech;
use crate::push::{PushEvent, PushHub};
use crate::store::MailStore;
use crate::{api, AppState};

/// Request bodies are small JSON documents; anything bigger is abuse.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the full application with middleware applied.
pub fn app(state: AppState) -> Router {
    api::router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let store = MailStore::new(&config.mailbox.domain);
    let push = PushHub::new();

    if config.reaper.enabled {
        spawn_reaper(
            store.clone(),
            push.clone(),
            Duration::from_secs(config.reaper.interval_secs.max(1)),
        );
    }

    let state = AppState {
        store,
        push,
        speech: Arc::new(NullSpeech),
    };
    let app = app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        domain = %config.mailbox.domain,
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically evict sessions past their expiry and tell their topics.
///
/// Without this, abandoned inboxes accumulate until the process dies; the
/// client-side countdown alone never frees server memory.
fn spawn_reaper(store: MailStore, push: PushHub, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired();
            if removed.is_empty() {
                continue;
            }
            info!(
                name: "session.reaped",
                count = removed.len(),
                "Expired sessions removed"
            );
            for session_id in &removed {
                push.publish(session_id, PushEvent::Expired);
                push.prune(session_id);
            }
        }
    });
}
