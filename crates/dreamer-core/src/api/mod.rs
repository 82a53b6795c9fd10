//! REST client module for the info backend.
//!
//! `ApiClient` performs the actual `GET /api/info` request. `InfoService`
//! only depends on the `InfoSource` trait so tests can swap in a scripted
//! source.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::ProfileSnapshot;

pub use client::{ApiClient, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;

/// Something that can produce a fresh info document.
#[async_trait]
pub trait InfoSource: Send + Sync {
    async fn fetch_info(&self) -> Result<ProfileSnapshot, ApiError>;
}
