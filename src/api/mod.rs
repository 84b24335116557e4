//! Posts backend client
//!
//! Provides a trait over the two endpoints the dialog needs so the submission
//! logic can run against the HTTP backend or an in-memory fake.

mod http;

pub use http::{DEFAULT_TIMEOUT_SECS, HttpPostsApi, normalize_base_url};

use crate::error::Result;
use crate::types::{CreatePostRequest, CreatePostResponse, RelatedPost};
use async_trait::async_trait;

/// Path of the related posts resource, relative to the API base URL
pub const RELATED_POSTS_PATH: &str = "/posts/related";

/// Posts backend operations
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// Create a post from a title, optional topic and uploaded image
    async fn create_post(&self, request: &CreatePostRequest) -> Result<CreatePostResponse>;

    /// Fetch the latest created posts
    async fn related_posts(&self) -> Result<Vec<RelatedPost>>;
}
