//! End-to-end tests against the assembled router.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use tempbox::helper::NullSpeech;
use tempbox::push::PushHub;
use tempbox::server;
use tempbox::store::MailStore;
use tempbox::AppState;

fn test_state() -> AppState {
    AppState {
        store: MailStore::new("example.test"),
        push: PushHub::new(),
        speech: Arc::new(NullSpeech),
    }
}

fn test_server() -> TestServer {
    TestServer::new(server::app(test_state())).expect("test server should start")
}

async fn create_session(server: &TestServer, ttl: i64) -> Value {
    let response = server.post("/api/session").json(&json!({ "ttl": ttl })).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["session"].clone()
}

#[tokio::test]
async fn test_create_session() {
    let server = test_server();
    let session = create_session(&server, 600).await;

    assert_eq!(session["ttl"], 600);
    let created_at = session["createdAt"].as_i64().unwrap();
    let expires_at = session["expiresAt"].as_i64().unwrap();
    assert_eq!(expires_at - created_at, 600 * 1000);
    assert!(session["email"].as_str().unwrap().ends_with("@example.test"));
    assert_eq!(session["messages"], json!([]));
}

#[tokio::test]
async fn test_create_session_coerces_unlisted_ttl() {
    let server = test_server();
    let session = create_session(&server, 42).await;
    assert_eq!(session["ttl"], 3600);
}

#[tokio::test]
async fn test_get_session() {
    let server = test_server();
    let session = create_session(&server, 600).await;
    let id = session["id"].as_str().unwrap();

    let response = server.get("/api/session").add_query_param("sessionId", id).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["session"], session);
}

#[tokio::test]
async fn test_get_session_missing_param() {
    let server = test_server();
    let response = server.get("/api/session").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Missing session");
}

#[tokio::test]
async fn test_get_session_unknown_id() {
    let server = test_server();
    let response = server
        .get("/api/session")
        .add_query_param("sessionId", "no-such-id")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Session not found");
}

#[tokio::test]
async fn test_rotate_restore_scenario() {
    let server = test_server();
    let session = create_session(&server, 600).await;
    let id = session["id"].as_str().unwrap().to_string();

    // Give the inbox some content before rotating.
    let pushed = server.post("/api/messages").json(&json!({ "sessionId": id })).await;
    pushed.assert_status(StatusCode::CREATED);

    let rotated = server
        .post("/api/session/rotate")
        .json(&json!({ "sessionId": id, "ttl": 600 }))
        .await;
    rotated.assert_status_ok();
    let body = rotated.json::<Value>();
    let old_session = body["oldSession"].clone();
    let new_session = body["newSession"].clone();

    assert_eq!(old_session["id"], id.as_str());
    assert_eq!(old_session["messages"].as_array().unwrap().len(), 1);
    assert_ne!(new_session["id"], old_session["id"]);
    assert_eq!(new_session["messages"], json!([]));

    // The old inbox is gone until restored.
    server
        .get("/api/session")
        .add_query_param("sessionId", &id)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let restored = server
        .post("/api/session/restore")
        .json(&json!({ "snapshot": old_session }))
        .await;
    restored.assert_status_ok();
    assert_eq!(restored.json::<Value>()["session"], old_session);

    let fetched = server
        .get("/api/session")
        .add_query_param("sessionId", &id)
        .await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["session"], old_session);
}

#[tokio::test]
async fn test_rotate_unknown_session_creates_fresh() {
    let server = test_server();
    let response = server
        .post("/api/session/rotate")
        .json(&json!({ "sessionId": "never-existed", "ttl": 600 }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body.get("oldSession").is_none());
    assert_eq!(body["newSession"]["ttl"], 600);
}

#[tokio::test]
async fn test_rotate_missing_session_id() {
    let server = test_server();
    let response = server.post("/api/session/rotate").json(&json!({ "ttl": 600 })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Missing session");
}

#[tokio::test]
async fn test_restore_rejects_bad_snapshot() {
    let server = test_server();
    let response = server.post("/api/session/restore").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid snapshot");
}

#[tokio::test]
async fn test_update_avatar() {
    let server = test_server();
    let session = create_session(&server, 600).await;
    let id = session["id"].as_str().unwrap();

    let response = server
        .post("/api/session/avatar")
        .json(&json!({ "sessionId": id, "avatar": "🦉" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["session"]["avatar"], "🦉");

    let missing = server
        .post("/api/session/avatar")
        .json(&json!({ "sessionId": id }))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "Missing data");

    let unknown = server
        .post("/api/session/avatar")
        .json(&json!({ "sessionId": "no-such-id", "avatar": "🦉" }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_lifecycle() {
    let server = test_server();
    let session = create_session(&server, 600).await;
    let id = session["id"].as_str().unwrap().to_string();

    let first = server.post("/api/messages").json(&json!({ "sessionId": id })).await;
    first.assert_status(StatusCode::CREATED);
    let first_id = first.json::<Value>()["message"]["id"].as_str().unwrap().to_string();

    let second = server.post("/api/messages").json(&json!({ "sessionId": id })).await;
    second.assert_status(StatusCode::CREATED);
    let second_id = second.json::<Value>()["message"]["id"].as_str().unwrap().to_string();

    let listed = server
        .get("/api/messages")
        .add_query_param("sessionId", &id)
        .await;
    listed.assert_status_ok();
    let messages = listed.json::<Value>()["messages"].as_array().unwrap().clone();
    assert_eq!(messages.len(), 2);
    // Most recent first.
    assert_eq!(messages[0]["id"], second_id.as_str());
    assert_eq!(messages[1]["id"], first_id.as_str());
}

#[tokio::test]
async fn test_push_message_unknown_session() {
    let server = test_server();
    let response = server
        .post("/api/messages")
        .json(&json!({ "sessionId": "no-such-id" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Session not found");
}

#[tokio::test]
async fn test_list_messages_missing_param() {
    let server = test_server();
    let response = server.get("/api/messages").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_verb_is_405() {
    let server = test_server();
    let response = server.delete("/api/session").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json::<Value>()["error"], "Method not allowed");
}

#[tokio::test]
async fn test_helper_insights() {
    let server = test_server();
    let session = create_session(&server, 600).await;
    let id = session["id"].as_str().unwrap().to_string();

    server
        .post("/api/messages")
        .json(&json!({ "sessionId": id }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/helper/insights")
        .json(&json!({ "sessionId": id, "prompt": "is this phishing?" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert!(!body["summary"].as_array().unwrap().is_empty());
    assert_eq!(body["usernameIdeas"].as_array().unwrap().len(), 3);
    assert_eq!(body["voiceAvailable"], false);
    let replies: Vec<String> = body["replies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|reply| reply.as_str().unwrap().to_string())
        .collect();
    assert!(replies.iter().any(|reply| reply.contains("Phishing")));
}

#[tokio::test]
async fn test_helper_insights_empty_inbox() {
    let server = test_server();
    let session = create_session(&server, 600).await;
    let id = session["id"].as_str().unwrap();

    let response = server
        .post("/api/helper/insights")
        .json(&json!({ "sessionId": id }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert_eq!(body["summary"], json!([]));
    // No message selected yields the nominal floor, not zero risk.
    assert_eq!(body["phishing"]["level"], "Low");
    assert_eq!(body["phishing"]["score"], 0.1);
    assert_eq!(body["replies"][0], "Select a mail so I can guide you.");
}

#[tokio::test]
async fn test_helper_insights_unknown_session() {
    let server = test_server();
    let response = server
        .post("/api/helper/insights")
        .json(&json!({ "sessionId": "no-such-id" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_push_channel_delivers_new_mail() {
    let server = TestServer::builder()
        .http_transport()
        .build(server::app(test_state()))
        .expect("test server should start");

    let session = create_session(&server, 600).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let mut websocket = server.get_websocket("/api/ws").await.into_websocket().await;
    websocket
        .send_json(&json!({ "action": "join", "sessionId": session_id }))
        .await;

    // The pong confirms the join was processed before we publish.
    websocket.send_json(&json!({ "action": "ping" })).await;
    let pong = websocket.receive_json::<Value>().await;
    assert_eq!(pong["event"], "pong");
    assert!(pong["payload"].as_i64().unwrap() > 0);

    server
        .post("/api/messages")
        .json(&json!({ "sessionId": session_id }))
        .await
        .assert_status(StatusCode::CREATED);

    let event = websocket.receive_json::<Value>().await;
    assert_eq!(event["event"], "session:message");
    assert_eq!(event["payload"]["sessionId"], session_id.as_str());
}

#[tokio::test]
async fn test_push_channel_leave_releases_topic() {
    let state = test_state();
    let push = state.push.clone();
    let server = TestServer::builder()
        .http_transport()
        .build(server::app(state))
        .expect("test server should start");

    let session = create_session(&server, 600).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let mut websocket = server.get_websocket("/api/ws").await.into_websocket().await;
    websocket
        .send_json(&json!({ "action": "join", "sessionId": session_id }))
        .await;
    websocket.send_json(&json!({ "action": "ping" })).await;
    let _pong = websocket.receive_json::<Value>().await;
    assert_eq!(push.topic_count(), 1);

    websocket
        .send_json(&json!({ "action": "leave", "sessionId": session_id }))
        .await;
    // Frames are handled in order, so this pong proves the leave (and
    // its prune) has completed.
    websocket.send_json(&json!({ "action": "ping" })).await;
    let _pong = websocket.receive_json::<Value>().await;
    assert_eq!(push.topic_count(), 0);
}
