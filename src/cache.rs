//! Related posts cache
//!
//! Keeps the last fetched "related posts" list for a freshness window. A
//! successful create marks it stale through [`RelatedPostsInvalidator`] so the
//! next read goes back to the backend.

use crate::api::PostsApi;
use crate::error::Result;
use crate::types::RelatedPost;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// Receiver of the "related posts changed" signal
pub trait RelatedPostsInvalidator: Send + Sync {
    /// Mark the related posts list stale
    fn invalidate_related_posts(&self);
}

/// Invalidator that does nothing
pub struct NoopInvalidator;

impl RelatedPostsInvalidator for NoopInvalidator {
    fn invalidate_related_posts(&self) {}
}

struct Entry {
    posts: Vec<RelatedPost>,
    fetched_at: Instant,
    invalidated: bool,
}

/// Cached view of `GET /posts/related`
pub struct RelatedPostsCache {
    api: Arc<dyn PostsApi>,
    stale_after: Duration,
    retry_delay: Duration,
    entry: Mutex<Option<Entry>>,
}

impl RelatedPostsCache {
    /// Create an empty cache
    pub fn new(api: Arc<dyn PostsApi>, stale_after: Duration, retry_delay: Duration) -> Self {
        Self {
            api,
            stale_after,
            retry_delay,
            entry: Mutex::new(None),
        }
    }

    fn fresh(&self) -> Option<Vec<RelatedPost>> {
        let entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|e| !e.invalidated && e.fetched_at.elapsed() < self.stale_after)
            .map(|e| e.posts.clone())
    }

    /// Whether the next [`get`](Self::get) will hit the backend
    pub fn is_stale(&self) -> bool {
        self.fresh().is_none()
    }

    /// Related posts, from cache while fresh
    pub async fn get(&self) -> Result<Vec<RelatedPost>> {
        if let Some(posts) = self.fresh() {
            debug!(count = posts.len(), "related posts served from cache");
            return Ok(posts);
        }
        self.refresh().await
    }

    /// Fetch from the backend and replace the cached list.
    ///
    /// A failed fetch is retried once after the retry delay.
    pub async fn refresh(&self) -> Result<Vec<RelatedPost>> {
        let posts = match self.api.related_posts().await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(error = %e, "fetching related posts failed, retrying");
                time::sleep(self.retry_delay).await;
                self.api.related_posts().await?
            }
        };

        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *entry = Some(Entry {
            posts: posts.clone(),
            fetched_at: Instant::now(),
            invalidated: false,
        });
        Ok(posts)
    }
}

impl RelatedPostsInvalidator for RelatedPostsCache {
    fn invalidate_related_posts(&self) {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = entry.as_mut() {
            e.invalidated = true;
        }
        debug!("related posts invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{CreatePostRequest, CreatePostResponse};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls, then returns one post
    struct CountingApi {
        calls: AtomicUsize,
        failures: usize,
    }

    impl CountingApi {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failures,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PostsApi for CountingApi {
        async fn create_post(&self, _request: &CreatePostRequest) -> Result<CreatePostResponse> {
            Err(Error::Internal("not used".to_string()))
        }

        async fn related_posts(&self) -> Result<Vec<RelatedPost>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(Error::Api {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
            Ok(vec![RelatedPost {
                id: n as u64,
                title: format!("post {n}"),
                topic: None,
                image_url: format!("https://cdn.example.com/{n}.png"),
                created_at: Utc::now(),
            }])
        }
    }

    fn cache(api: Arc<CountingApi>) -> RelatedPostsCache {
        RelatedPostsCache::new(api, Duration::from_secs(300), Duration::from_millis(500))
    }

    #[tokio::test(start_paused = true)]
    async fn test_served_from_cache_while_fresh() {
        let api = CountingApi::new(0);
        let cache = cache(Arc::clone(&api));

        assert!(cache.is_stale());
        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(api.calls(), 1);
        assert!(!cache.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_after_stale_window() {
        let api = CountingApi::new(0);
        let cache = cache(Arc::clone(&api));

        cache.get().await.unwrap();
        time::sleep(Duration::from_secs(301)).await;
        assert!(cache.is_stale());
        cache.get().await.unwrap();
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let api = CountingApi::new(0);
        let cache = cache(Arc::clone(&api));

        cache.get().await.unwrap();
        cache.invalidate_related_posts();
        assert!(cache.is_stale());
        let posts = cache.get().await.unwrap();
        assert_eq!(api.calls(), 2);
        assert_eq!(posts[0].id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_once() {
        let api = CountingApi::new(1);
        let cache = cache(Arc::clone(&api));

        let posts = cache.get().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_one_retry() {
        let api = CountingApi::new(2);
        let cache = cache(Arc::clone(&api));

        let err = cache.get().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(api.calls(), 2);
        assert!(cache.is_stale());
    }
}
