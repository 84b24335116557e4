//! HTTP implementation of the posts backend

use crate::api::{PostsApi, RELATED_POSTS_PATH};
use crate::error::{Error, NETWORK_FAILURE, Result};
use crate::types::{CreatePostRequest, CreatePostResponse, RelatedPost};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, header};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ensure the base URL ends with `/api`
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with("/api") {
        url.to_string()
    } else if url.ends_with('/') {
        format!("{url}api")
    } else {
        format!("{url}/api")
    }
}

/// Posts backend over HTTP using reqwest
pub struct HttpPostsApi {
    client: Client,
    base_url: String,
}

impl HttpPostsApi {
    /// Create a client for `base_url` (normalized to end in `/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Translate transport failures into the network error the dialog shows
fn send_error(e: reqwest::Error) -> Error {
    if e.is_connect() || e.is_timeout() {
        debug!(error = %e, "request did not reach the server");
        Error::Network(NETWORK_FAILURE.to_string())
    } else {
        Error::Http(e)
    }
}

/// Pull a message out of a JSON error body (`message` may be a list)
fn json_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), String::from))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

/// Build an API error from a non-success response
async fn error_from_response(response: Response, fallback: &str) -> Error {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let text = response.text().await.unwrap_or_default();
    let message = if is_json {
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => json_message(&body),
            Err(_) => Some(if text.is_empty() { fallback.to_string() } else { text }),
        }
    } else {
        Some(if text.is_empty() { fallback.to_string() } else { text })
    };

    let message = message.unwrap_or_else(|| {
        format!(
            "Error {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    });
    debug!(status = status.as_u16(), %message, "request failed");

    Error::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn create_post(&self, request: &CreatePostRequest) -> Result<CreatePostResponse> {
        let url = self.endpoint(RELATED_POSTS_PATH);
        debug!(
            %url,
            title = %request.title,
            topic = request.topic.as_deref().unwrap_or("(none)"),
            image = request.image.name(),
            size = request.image.size(),
            "creating post"
        );

        let image = Part::bytes(request.image.bytes().to_vec())
            .file_name(request.image.name().to_string())
            .mime_str(request.image.mime_type())
            .map_err(|e| Error::InvalidArgument(format!("invalid MIME type: {e}")))?;

        let mut form = Form::new().text("title", request.title.clone());
        if let Some(ref topic) = request.topic {
            form = form.text("topic", topic.clone());
        }
        let form = form.part("image", image);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to create post").await);
        }

        let created: CreatePostResponse = response.json().await?;
        debug!(post_id = created.post.id, "created post");
        Ok(created)
    }

    async fn related_posts(&self) -> Result<Vec<RelatedPost>> {
        let url = self.endpoint(RELATED_POSTS_PATH);
        debug!(%url, "fetching related posts");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to fetch posts").await);
        }

        let posts: Vec<RelatedPost> = response.json().await?;
        debug!(count = posts.len(), "fetched related posts");
        Ok(posts)
    }
}
