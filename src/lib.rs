//! litepost - create-post workflow for the Lite-Tech blog
//!
//! The library models the "upload your post" dialog as an explicit state
//! machine: a title and an image are collected, the image goes through a
//! cancellable (simulated) upload, and the post is created on the posts
//! backend with a multipart request.
//!
//! - [`upload`] drives the timed upload sequence behind an owned handle
//! - [`validation`] checks the title and image fields
//! - [`submission`] holds the state machine, its async driver and the view
//! - [`api`] and [`cache`] talk to the posts backend

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod submission;
pub mod types;
pub mod upload;
pub mod validation;

pub use error::{Error, Result};
