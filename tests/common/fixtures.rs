//! Test fixtures

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use litepost::types::{CreatePostResponse, RelatedPost, SelectedFile};
use litepost::upload::{FailurePolicy, SimulatorConfig};

/// A 50 KB PNG image
pub fn png(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", vec![0x89_u8; 50 * 1024])
}

/// A PDF document
pub fn pdf() -> SelectedFile {
    SelectedFile::new("notes.pdf", "application/pdf", b"%PDF-1.7".to_vec())
}

/// A post as the backend would return it
pub fn post(id: u64, title: &str) -> RelatedPost {
    RelatedPost {
        id,
        title: title.to_string(),
        topic: None,
        image_url: format!("https://cdn.example.com/posts/{id}.png"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

/// Successful create-post response
pub fn created(id: u64, title: &str) -> CreatePostResponse {
    CreatePostResponse {
        message: "Post created successfully".to_string(),
        post: post(id, title),
    }
}

/// Default simulator timing that never fails
pub fn reliable() -> SimulatorConfig {
    SimulatorConfig {
        failure: FailurePolicy::Never,
        ..SimulatorConfig::default()
    }
}
