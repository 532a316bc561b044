//! HTTP API tests driven in-process through the router

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ecovoyage::api::AppState;
use ecovoyage::search::SearchRequest;
use ecovoyage::{EcoVoyageConfig, EcoVoyageError, SearchBackend, SearchGateway, web};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Answers destination searches with two records, suggestions with one,
/// fails for the query "offline" and panics for "explode"
struct StubIndex;

#[async_trait]
impl SearchBackend for StubIndex {
    async fn query(&self, request: &SearchRequest) -> ecovoyage::Result<Vec<Value>> {
        if request.query == "explode" {
            panic!("index stand-in crashed");
        }
        if request.query == "offline" {
            return Err(EcoVoyageError::search("connection refused"));
        }
        if request.attributes_to_retrieve.len() == 3 {
            return Ok(vec![json!({"name": "Reykjavik Green City Break", "country": "Iceland", "region": "Reykjavik"})]);
        }
        Ok(vec![
            json!({
                "objectID": "is-1",
                "name": "Westfjords Glacier Bay",
                "region": "Westfjords",
                "country": "Iceland",
                "sustainability_score": 9.4,
                "carbon_footprint_score": 1.2,
                "transport_options": []
            }),
            json!({"objectID": "is-2", "name": null, "sustainability_score": "n/a"}),
        ])
    }
}

fn app() -> axum::Router {
    app_keeping(EcoVoyageConfig::default().server.max_conversations)
}

fn app_keeping(max_conversations: usize) -> axum::Router {
    let config = EcoVoyageConfig::default();
    let gateway = Arc::new(SearchGateway::new(Arc::new(StubIndex), &config));
    let state = AppState::new(gateway, config.autocomplete.clone())
        .with_max_conversations(max_conversations);
    web::app(Arc::new(state), "does-not-exist")
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn new_conversation(app: &axum::Router) -> String {
    let (status, body) = call(app, "POST", "/api/conversations", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_suggested_queries() {
    let app = app();
    let (status, body) = call(&app, "GET", "/api/suggested-queries", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_new_conversation_starts_with_welcome() {
    let app = app();
    let id = new_conversation(&app).await;

    let (status, body) = call(&app, "GET", &format!("/api/conversations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], false);
    assert_eq!(body["turns"].as_array().unwrap().len(), 1);
    assert_eq!(body["turns"][0]["role"], "assistant");
    assert_eq!(body["suggested_queries"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_unknown_conversation_is_404() {
    let app = app();
    let uri = format!("/api/conversations/{}", uuid::Uuid::new_v4());
    let (status, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Not found"));
}

#[tokio::test]
async fn test_message_returns_user_and_assistant_turns() {
    let app = app();
    let id = new_conversation(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{id}/messages"),
        Some(json!({"text": "glaciers in Iceland"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let turns = body["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[1]["role"], "assistant");
    assert_eq!(turns[1]["error"], false);

    let cards = turns[1]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["status"], "ok");
    assert_eq!(cards[0]["view"]["name"], "Westfjords Glacier Bay");
    assert_eq!(cards[0]["view"]["transport"], json!([]));
    assert_eq!(cards[1]["view"]["name"], "Unnamed Destination");
    assert_eq!(cards[1]["view"]["carbon"]["fill"], 0.5);

    let (_, conversation) = call(&app, "GET", &format!("/api/conversations/{id}"), None).await;
    assert_eq!(conversation["turns"].as_array().unwrap().len(), 3);
    assert_eq!(conversation["suggested_queries"], json!([]));
}

#[tokio::test]
async fn test_failed_search_is_an_error_turn_not_http_error() {
    let app = app();
    let id = new_conversation(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{id}/messages"),
        Some(json!({"text": "offline"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turns"][1]["error"], true);
    let text: String = body["turns"][1]["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["text"].as_str().unwrap_or_default())
        .collect();
    assert!(text.contains("issue while searching"));
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let app = app();
    let id = new_conversation(&app).await;

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/conversations/{id}/messages"),
        Some(json!({"text": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_draft_feeds_debounced_suggestions() {
    let app = app();
    let id = new_conversation(&app).await;
    let draft = format!("/api/conversations/{id}/draft");

    for text in ["re", "rey", "reyk"] {
        let (status, _) = call(&app, "POST", &draft, Some(json!({ "text": text }))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let (_, pending) = call(&app, "GET", &format!("/api/conversations/{id}/suggestions"), None).await;
    assert_eq!(pending["pending"], true);

    tokio::time::sleep(Duration::from_millis(500)).await;

    let (status, body) = call(&app, "GET", &format!("/api/conversations/{id}/suggestions"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], false);
    assert_eq!(body["query"], "reyk");
    assert_eq!(body["suggestions"][0]["name"], "Reykjavik Green City Break");
}

#[tokio::test]
async fn test_oldest_conversation_is_evicted_beyond_capacity() {
    let app = app_keeping(3);
    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(new_conversation(&app).await);
    }

    let (status, _) = call(&app, "GET", &format!("/api/conversations/{}", ids[0]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for id in &ids[1..] {
        let (status, _) = call(&app, "GET", &format!("/api/conversations/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_interrupted_search_does_not_wedge_conversation() {
    let app = app();
    let id = new_conversation(&app).await;
    let messages = format!("/api/conversations/{id}/messages");

    let (status, body) = call(&app, "POST", &messages, Some(json!({"text": "explode"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turns"][1]["role"], "assistant");
    assert_eq!(body["turns"][1]["error"], true);

    let (status, body) = call(&app, "POST", &messages, Some(json!({"text": "glaciers in Iceland"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turns"][1]["error"], false);

    let (_, conversation) = call(&app, "GET", &format!("/api/conversations/{id}"), None).await;
    assert_eq!(conversation["loading"], false);
    assert_eq!(conversation["turns"].as_array().unwrap().len(), 5);
}
