//! Data layer for the Dreamer's Land homepage and verification portal.
//!
//! Fetches the `/api/info` profile document from the backend, caches it
//! for a short window, and falls back to a bundled profile whenever the
//! backend can't be reached, so callers always have something to render.

pub mod accessor;
pub mod api;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod defaults;
pub mod models;
pub mod service;
pub mod utils;
pub mod views;

pub use accessor::{AccessorState, InfoAccessor};
pub use api::{ApiClient, ApiError, InfoSource};
pub use cache::{CacheManager, CachedData};
pub use config::{Config, StalePolicy};
pub use models::{PresenceStatus, ProfileSnapshot, Stat};
pub use service::{DataResult, DataSource, InfoService};
pub use views::{HomepageView, PageMeta, PortalView};
