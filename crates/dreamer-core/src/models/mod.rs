//! Data models for the `/api/info` document.
//!
//! - `ProfileSnapshot`: the full document with `health`, `bot`, `guild`,
//!   `owner` and `youtube` sections
//! - `Stat`: a value that may carry the `"NA"` sentinel
//! - `PresenceStatus`, `StatusBadge`: owner presence and its badge

pub mod presence;
pub mod snapshot;
pub mod stat;

pub use presence::{BadgeColor, PresenceStatus, StatusBadge};
pub use snapshot::{BotInfo, GuildInfo, Health, OwnerInfo, ProfileSnapshot, Uptime, YoutubeInfo};
pub use stat::{Stat, NA};
