//! HTTP client tests against a mock server

use litepost::api::{HttpPostsApi, PostsApi};
use litepost::error::{Error, NETWORK_FAILURE};
use litepost::types::{CreatePostRequest, SelectedFile};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

fn request(topic: Option<&str>) -> CreatePostRequest {
    CreatePostRequest {
        title: "Hello World".to_string(),
        topic: topic.map(String::from),
        image: SelectedFile::new("cover.png", "image/png", b"PNGDATA".to_vec()),
    }
}

fn post_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Hello World",
        "topic": "Rust",
        "imageUrl": format!("https://cdn.example.com/{id}.png"),
        "createdAt": "2024-05-01T12:00:00Z"
    })
}

fn api(server: &mockito::ServerGuard) -> HttpPostsApi {
    HttpPostsApi::new(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_create_post_sends_multipart() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/posts/related")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="title""#.to_string()),
            Matcher::Regex("Hello World".to_string()),
            Matcher::Regex(r#"name="topic""#.to_string()),
            Matcher::Regex(r#"filename="cover.png""#.to_string()),
            Matcher::Regex("image/png".to_string()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "message": "Post created successfully", "post": post_json(7) }).to_string(),
        )
        .create_async()
        .await;

    let created = api(&server).create_post(&request(Some("Rust"))).await.unwrap();

    mock.assert_async().await;
    assert_eq!(created.post.id, 7);
    assert_eq!(created.post.topic.as_deref(), Some("Rust"));
    assert_eq!(created.message, "Post created successfully");
}

#[tokio::test]
async fn test_empty_error_body_uses_fallback() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/posts/related")
        .with_status(500)
        .create_async()
        .await;

    let err = api(&server).create_post(&request(None)).await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to create post");
}

#[tokio::test]
async fn test_json_error_message_list() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/posts/related")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({ "message": ["title should not be empty"] }).to_string())
        .create_async()
        .await;

    let err = api(&server).create_post(&request(None)).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "title should not be empty");
}

#[tokio::test]
async fn test_text_error_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/posts/related")
        .with_status(500)
        .with_header("content-type", "text/plain")
        .with_body("Database unavailable")
        .create_async()
        .await;

    let err = api(&server).create_post(&request(None)).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Database unavailable");
}

#[tokio::test]
async fn test_json_error_without_message_uses_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/posts/related")
        .with_status(502)
        .with_header("content-type", "application/json")
        .with_body(json!({ "error": "upstream" }).to_string())
        .create_async()
        .await;

    let err = api(&server).create_post(&request(None)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Api { status: 502, ref message } if message == "Error 502: Bad Gateway"
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let api = HttpPostsApi::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let err = api.create_post(&request(None)).await.unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.user_message(), NETWORK_FAILURE);
}

#[tokio::test]
async fn test_related_posts_bypasses_caches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/posts/related")
        .match_header("cache-control", "no-store")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([post_json(1), post_json(2)]).to_string())
        .create_async()
        .await;

    let posts = api(&server).related_posts().await.unwrap();

    mock.assert_async().await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].image_url, "https://cdn.example.com/2.png");
}

#[tokio::test]
async fn test_related_posts_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/posts/related")
        .with_status(503)
        .create_async()
        .await;

    let err = api(&server).related_posts().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}
