//! The `/api/info` document.
//!
//! Every section and field is optional on the wire. Missing strings become
//! empty, missing counters become [`Stat::Unknown`], and a missing section
//! becomes its default, so consumers can read any path without checking.

use serde::{Deserialize, Serialize};

use super::{PresenceStatus, Stat};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    pub health: Health,
    pub bot: BotInfo,
    pub guild: GuildInfo,
    pub owner: OwnerInfo,
    pub youtube: YoutubeInfo,
}

impl ProfileSnapshot {
    /// Parse a response body, rejecting anything that isn't a JSON object.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if !value.is_object() {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "expected a JSON object at the top level",
            ));
        }
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    pub status: String,
    pub timestamp: Stat,
    pub uptime: Uptime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Uptime {
    pub uptime_ms: Stat,
    pub uptime_formatted: Stat,
    pub start_time: Stat,
}

/// The Discord bot account that serves the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BotInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub tag: String,
    pub avatar_url: String,
    pub banner_url: Option<String>,
    pub verified: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuildInfo {
    pub id: String,
    pub name: String,
    pub member_count: Stat,
    pub member_count_formatted: Stat,
    pub verified_user_count: Stat,
    pub verified_user_count_formatted: Stat,
    pub icon_url: String,
    pub banner_url: Option<String>,
}

impl GuildInfo {
    pub fn members_display(&self) -> Stat {
        Stat::formatted_pair(&self.member_count, &self.member_count_formatted)
    }

    pub fn verified_display(&self) -> Stat {
        Stat::formatted_pair(
            &self.verified_user_count,
            &self.verified_user_count_formatted,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OwnerInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
    pub banner_url: Option<String>,
    pub status: PresenceStatus,
    pub created_at: String,
    pub about: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YoutubeInfo {
    pub channel_id: String,
    pub channel_title: String,
    pub description: String,
    pub custom_username: String,
    pub subscriber_count: Stat,
    pub subscriber_count_formatted: Stat,
    pub video_count: Stat,
    pub video_count_formatted: Stat,
    pub view_count: Stat,
    pub view_count_formatted: Stat,
    pub members_count: Stat,
    pub members_count_formatted: Stat,
    pub logo_url: String,
    pub banner_url: String,
    pub channel_url: String,
    pub published_at: String,
    pub country: String,
}

impl YoutubeInfo {
    pub fn subscribers_display(&self) -> Stat {
        Stat::formatted_pair(&self.subscriber_count, &self.subscriber_count_formatted)
    }

    pub fn videos_display(&self) -> Stat {
        Stat::formatted_pair(&self.video_count, &self.video_count_formatted)
    }

    pub fn views_display(&self) -> Stat {
        Stat::formatted_pair(&self.view_count, &self.view_count_formatted)
    }

    pub fn members_display(&self) -> Stat {
        Stat::formatted_pair(&self.members_count, &self.members_count_formatted)
    }
}
