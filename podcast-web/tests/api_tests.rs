//! Integration tests for podcast-web HTTP routes
//!
//! Tests cover:
//! - Page routes (HTML) and their props (JSON)
//! - Not-found and source failure responses
//! - Player session API
//! - Health endpoint

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create request
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create request with a JSON body
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).expect("Should parse JSON"))
}

/// Episode ids behind the play buttons of the rendered home page, in queue order
async fn rendered_queue(app: &Router) -> Vec<String> {
    let (_, bytes) = send(app, test_request("GET", "/")).await;
    let html = String::from_utf8(bytes).unwrap();
    html.split(r#"data-episode=""#)
        .skip(1)
        .map(|rest| rest.split('"').next().unwrap().to_string())
        .collect()
}

fn play_list_request(session: &str, queue: &[String], index: usize) -> Request<Body> {
    json_request(
        "POST",
        &format!("/api/player/{}/play-list", session),
        json!({ "episode_ids": queue, "index": index }),
    )
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = common::app(&common::source(1));

    let (status, body) = send_json(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "podcast-web");
    assert!(body["version"].is_string());
    assert_eq!(body["cachedPages"]["home"], false);
    assert_eq!(body["cachedPages"]["episodes"], 0);
    assert_eq!(body["playerSessions"], 0);
}

#[tokio::test]
async fn test_health_counts_generated_pages_without_fetching() {
    let source = common::source(3);
    let app = common::app(&source);
    send(&app, test_request("GET", "/")).await;
    send(&app, test_request("GET", "/episodes/ep-01")).await;
    send(&app, test_request("POST", "/api/player")).await;

    let (status, body) = send_json(&app, test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cachedPages"]["home"], true);
    assert_eq!(body["cachedPages"]["episodes"], 1);
    assert_eq!(body["playerSessions"], 1);

    source.set_failure(Some("down")).await;
    let (status, _) = send_json(&app, test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.list_fetches(), 1);
}

// =============================================================================
// Page Routes
// =============================================================================

#[tokio::test]
async fn test_home_page_html() {
    let app = common::app(&common::source(12));

    let (status, bytes) = send(&app, test_request("GET", "/")).await;
    let html = String::from_utf8(bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Podcast | Tec</title>"));
    assert!(html.contains(r#"href="/episodes/ep-12""#));
    assert!(html.contains(r#"data-play-list="11" data-episode="ep-01""#));
    assert!(!html.contains(r#"data-play-list="12""#));
    assert_eq!(rendered_queue(&app).await.len(), 12);
}

#[tokio::test]
async fn test_episode_page_html() {
    let app = common::app(&common::source(3));

    let (status, bytes) = send(&app, test_request("GET", "/episodes/ep-02")).await;
    let html = String::from_utf8(bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Episode 2 | Tec</title>"));
    assert!(html.contains("<p>Show notes 2</p>"));
    assert!(html.contains("00:03:20"));
    assert!(html.contains("2 Jan 21"));
}

#[tokio::test]
async fn test_unknown_episode_page_is_404() {
    let app = common::app(&common::source(3));

    let (status, bytes) = send(&app, test_request("GET", "/episodes/does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(String::from_utf8(bytes).unwrap().contains("404"));
}

#[tokio::test]
async fn test_source_failure_is_502() {
    let source = common::source(3);
    source.set_failure(Some("connection refused")).await;
    let app = common::app(&source);

    let (status, _) = send(&app, test_request("GET", "/")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = send(&app, test_request("GET", "/episodes/ep-01")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_home_props_json() {
    let app = common::app(&common::source(12));

    let (status, body) = send_json(&app, test_request("GET", "/api/pages/home")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latestEpisodes"].as_array().unwrap().len(), 2);
    assert_eq!(body["allEpisodes"].as_array().unwrap().len(), 10);
    let first = &body["latestEpisodes"][0];
    assert_eq!(first["id"], "ep-12");
    assert_eq!(first["duration"], 1200);
    assert_eq!(first["durationAsString"], "00:20:00");
    assert_eq!(first["publishedAt"], "12 Jan 21");
    assert!(first.get("description").is_none());
}

#[tokio::test]
async fn test_episode_props_json() {
    let app = common::app(&common::source(3));

    let (status, body) = send_json(&app, test_request("GET", "/api/pages/episodes/ep-03")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["episode"]["description"], "<p>Show notes 3</p>");
    assert_eq!(body["episode"]["url"], "https://example.com/3.m4a");

    let (status, body) = send_json(&app, test_request("GET", "/api/pages/episodes/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_page_routes_share_cache() {
    let source = common::source(3);
    let app = common::app(&source);

    send(&app, test_request("GET", "/episodes/ep-01")).await;
    send(&app, test_request("GET", "/api/pages/episodes/ep-01")).await;
    send(&app, test_request("GET", "/episodes/ep-01")).await;

    assert_eq!(source.episode_fetches("ep-01").await, 1);
}

// =============================================================================
// Player Session API
// =============================================================================

#[tokio::test]
async fn test_create_session() {
    let app = common::app(&common::source(3));

    let (status, body) = send_json(&app, test_request("POST", "/api/player")).await;
    assert_eq!(status, StatusCode::CREATED);
    let session = body["session"].as_str().unwrap().to_string();

    let (status, body) = send_json(&app, test_request("GET", &format!("/api/player/{}", session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["episodeList"].as_array().unwrap().len(), 0);
    assert!(body["currentEpisodeIndex"].is_null());
}

#[tokio::test]
async fn test_play_single_episode() {
    let app = common::app(&common::source(3));

    let (status, body) = send_json(
        &app,
        json_request("POST", "/api/player/tab-1/play", json!({ "episode_id": "ep-02" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "playing");
    assert_eq!(body["currentEpisode"]["id"], "ep-02");
    assert_eq!(body["hasNext"], false);
    assert_eq!(body["hasPrevious"], false);
}

#[tokio::test]
async fn test_play_unknown_episode_is_404() {
    let app = common::app(&common::source(3));

    let (status, _) = send_json(
        &app,
        json_request("POST", "/api/player/tab-1/play", json!({ "episode_id": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_play_list_and_navigate() {
    let app = common::app(&common::source(5));

    let queue = rendered_queue(&app).await;
    assert_eq!(queue, ["ep-05", "ep-04", "ep-03", "ep-02", "ep-01"]);

    let (status, body) = send_json(&app, play_list_request("tab", &queue, 3)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["episodeList"].as_array().unwrap().len(), 5);
    assert_eq!(body["currentEpisode"]["id"], "ep-02");

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/next")).await;
    assert_eq!(body["currentEpisode"]["id"], "ep-01");
    assert_eq!(body["hasNext"], false);

    // Last position without loop stays put
    let (status, body) = send_json(&app, test_request("POST", "/api/player/tab/next")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentEpisodeIndex"], 4);

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/loop")).await;
    assert_eq!(body["isLooping"], true);
    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/next")).await;
    assert_eq!(body["currentEpisodeIndex"], 0);

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/previous")).await;
    assert_eq!(body["currentEpisodeIndex"], 0);
}

#[tokio::test]
async fn test_play_list_out_of_range_is_400() {
    let app = common::app(&common::source(3));

    let queue = rendered_queue(&app).await;
    let (status, body) = send_json(&app, play_list_request("tab", &queue, 3)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("index 3"));
}

#[tokio::test(start_paused = true)]
async fn test_play_list_uses_queue_as_rendered_after_revalidation() {
    let source = common::source(3);
    let app = common::app(&source);
    let queue = rendered_queue(&app).await;
    assert_eq!(queue[0], "ep-03");

    // New episode published, listing window passes and the refresh lands
    source.replace_records(common::records(4)).await;
    tokio::time::advance(Duration::from_secs(28_801)).await;
    send(&app, test_request("GET", "/")).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(rendered_queue(&app).await[0], "ep-04");

    let (status, body) = send_json(&app, play_list_request("tab", &queue, 0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentEpisode"]["id"], "ep-03");
    let ids: Vec<&str> = body["episodeList"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["ep-03", "ep-02", "ep-01"]);
}

#[tokio::test]
async fn test_play_list_resolves_ids_no_longer_listed() {
    let source = common::source(13);
    let app = common::app(&source);

    // ep-01 is past the 12-record listing, so it comes from the detail cache
    let queue = vec!["ep-13".to_string(), "ep-01".to_string()];
    let (status, body) = send_json(&app, play_list_request("tab", &queue, 1)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentEpisode"]["id"], "ep-01");
    assert!(body["currentEpisode"].get("description").is_none());
    assert_eq!(source.episode_fetches("ep-01").await, 1);
    assert_eq!(source.episode_fetches("ep-13").await, 0);
}

#[tokio::test]
async fn test_play_list_with_removed_episode_is_404() {
    let app = common::app(&common::source(3));
    let queue = vec!["ep-03".to_string(), "gone".to_string()];
    let (status, _) = send_json(&app, play_list_request("tab", &queue, 0)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_play_list_rejects_oversized_queue() {
    let source = common::source(3);
    let app = common::app(&source);
    let queue: Vec<String> = (0..13).map(|i| format!("ep-{:02}", i)).collect();

    let (status, body) = send_json(&app, play_list_request("tab", &queue, 0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid queue"));
    assert_eq!(source.total_episode_fetches().await, 0);
}

#[tokio::test]
async fn test_next_on_empty_queue_is_400() {
    let app = common::app(&common::source(3));
    let (status, _) = send_json(&app, test_request("POST", "/api/player/tab/next")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_and_playing_state() {
    let app = common::app(&common::source(3));
    let queue = rendered_queue(&app).await;
    send(&app, play_list_request("tab", &queue, 0)).await;

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/toggle")).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["currentEpisodeIndex"], 0);

    let (_, body) = send_json(
        &app,
        json_request("POST", "/api/player/tab/playing", json!({ "playing": true })),
    )
    .await;
    assert_eq!(body["isPlaying"], true);

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/shuffle")).await;
    assert_eq!(body["isShuffling"], true);
}

#[tokio::test]
async fn test_ended_advances_then_clears() {
    let app = common::app(&common::source(3));
    let queue = rendered_queue(&app).await;
    send(&app, play_list_request("tab", &queue, 1)).await;

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/ended")).await;
    assert_eq!(body["currentEpisodeIndex"], 2);

    let (_, body) = send_json(&app, test_request("POST", "/api/player/tab/ended")).await;
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn test_clear_player() {
    let app = common::app(&common::source(3));
    let queue = rendered_queue(&app).await;
    send(&app, play_list_request("tab", &queue, 2)).await;

    let (status, body) = send_json(&app, test_request("DELETE", "/api/player/tab")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["episodeList"].as_array().unwrap().len(), 0);
    assert!(body["currentEpisodeIndex"].is_null());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let app = common::app(&common::source(3));
    let queue = rendered_queue(&app).await;
    send(&app, play_list_request("a", &queue, 2)).await;

    let (_, body) = send_json(&app, test_request("GET", "/api/player/b")).await;
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn test_invalid_session_id_is_400() {
    let app = common::app(&common::source(3));
    let (status, body) = send_json(&app, test_request("GET", "/api/player/bad%20id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid session id"));
}

#[tokio::test]
async fn test_player_script_served() {
    let app = common::app(&common::source(1));
    let response = app.oneshot(test_request("GET", "/static/player.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript"
    );
}
