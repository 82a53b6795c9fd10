//! Bundled fallback profile.
//!
//! The fallback is what every consumer sees before the first fetch resolves
//! and whenever the backend is unreachable. It is compiled into the binary
//! from `data/fallback-data.json`; a copy on disk can override it.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::models::{GuildInfo, OwnerInfo, ProfileSnapshot, YoutubeInfo};

/// Bundled fallback document, parsed once on first use
static BUNDLED: OnceLock<Arc<ProfileSnapshot>> = OnceLock::new();

const BUNDLED_JSON: &str = include_str!("../data/fallback-data.json");

pub const OWNER_DISPLAY_NAME: &str = "Janvi Dreamer";
pub const OWNER_DISCORD_ID: &str = "1212719184870383621";
pub const OWNER_AVATAR_URL: &str = "/cdn/assets/image/pfp.avif";
pub const OWNER_ABOUT: &str = "Janvi Dreamer, whose real name is Janvi Gautam, from Madhya Pradesh, India. Born on 23rd February, she is a passionate creator who began her YouTube journey in 2022. Beyond content creation, Janvi finds joy in reading, writing, and playing video games, which fuel her creativity and imagination. She is also an avid traveller, always eager and enthusiastic to explore new places and experiences.";

pub const GUILD_ID: &str = "1080560914262139001";
pub const GUILD_NAME: &str = "Dreamer's Land";
pub const GUILD_ICON_URL: &str = "/cdn/assets/image/guild-logo.avif";
pub const GUILD_INVITE_URL: &str = "https://joindc.pages.dev";

pub const YOUTUBE_CHANNEL_ID: &str = "UCa4-5c2gCYxqummRhmh6V4Q";
pub const YOUTUBE_HANDLE: &str = "@janvidreamer";
pub const YOUTUBE_LOGO_URL: &str = "/cdn/assets/image/logo.avif";
pub const YOUTUBE_CHANNEL_URL: &str = "https://www.youtube.com/channel/UCa4-5c2gCYxqummRhmh6V4Q";

pub const INSTAGRAM_HANDLE: &str = "@janvidreamer";
pub const INSTAGRAM_URL: &str = "https://www.instagram.com/janvidreamer";

/// The compiled-in fallback profile.
pub fn bundled() -> Arc<ProfileSnapshot> {
    BUNDLED
        .get_or_init(|| match ProfileSnapshot::from_json(BUNDLED_JSON) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(error = %e, "Bundled fallback data is malformed, using basic profile");
                Arc::new(basic_profile())
            }
        })
        .clone()
}

/// Load the fallback profile, preferring an on-disk override.
///
/// An override that can't be read or parsed is logged and ignored.
pub fn load_fallback(path: Option<&Path>) -> Arc<ProfileSnapshot> {
    let Some(path) = path else {
        return bundled();
    };

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read fallback file");
            return bundled();
        }
    };

    match ProfileSnapshot::from_json(&contents) {
        Ok(snapshot) => {
            debug!(path = %path.display(), "Loaded fallback data from disk");
            Arc::new(snapshot)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse fallback file");
            bundled()
        }
    }
}

/// Last-resort profile used if the bundled asset is unusable.
pub fn basic_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        owner: OwnerInfo {
            id: OWNER_DISCORD_ID.to_string(),
            username: "janvidreamer".to_string(),
            display_name: OWNER_DISPLAY_NAME.to_string(),
            avatar_url: OWNER_AVATAR_URL.to_string(),
            about: OWNER_ABOUT.to_string(),
            ..Default::default()
        },
        guild: GuildInfo {
            id: GUILD_ID.to_string(),
            name: GUILD_NAME.to_string(),
            icon_url: GUILD_ICON_URL.to_string(),
            ..Default::default()
        },
        youtube: YoutubeInfo {
            channel_id: YOUTUBE_CHANNEL_ID.to_string(),
            channel_title: OWNER_DISPLAY_NAME.to_string(),
            custom_username: YOUTUBE_HANDLE.to_string(),
            logo_url: YOUTUBE_LOGO_URL.to_string(),
            channel_url: YOUTUBE_CHANNEL_URL.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}
