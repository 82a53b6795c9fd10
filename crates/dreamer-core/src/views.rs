//! Read-only projections of a snapshot for the homepage and the portal.
//!
//! Each view resolves blanks against the bundled site identity, so the
//! presentation layer can render every field as-is.

use serde::Serialize;

use crate::defaults;
use crate::models::{PresenceStatus, ProfileSnapshot, Stat, StatusBadge};

const TITLE_SUFFIX: &str = "Content Creator & YouTuber";
const DEFAULT_DESCRIPTION: &str = "Passionate content creator and YouTuber";

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Title and description a page head should carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub image: String,
}

impl PageMeta {
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        let name = or_default(&snapshot.owner.display_name, defaults::OWNER_DISPLAY_NAME);
        Self {
            title: format!("{} - {}", name, TITLE_SUFFIX),
            description: or_default(&snapshot.owner.about, DEFAULT_DESCRIPTION),
            image: or_default(&snapshot.owner.avatar_url, defaults::OWNER_AVATAR_URL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub handle: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerCard {
    pub discord_id: String,
    pub display_name: String,
    pub avatar_url: String,
    pub about: String,
    pub status: PresenceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerCard {
    pub id: String,
    pub name: String,
    pub invite_url: String,
    pub logo: String,
}

impl ServerCard {
    fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        let guild = &snapshot.guild;
        Self {
            id: or_default(&guild.id, defaults::GUILD_ID),
            name: or_default(&guild.name, defaults::GUILD_NAME),
            invite_url: defaults::GUILD_INVITE_URL.to_string(),
            logo: or_default(&guild.icon_url, defaults::GUILD_ICON_URL),
        }
    }
}

/// Everything the homepage hero, about and social sections read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomepageView {
    pub owner: OwnerCard,
    #[serde(skip)]
    pub status_badge: Option<StatusBadge>,
    pub youtube: SocialLink,
    pub instagram: SocialLink,
    pub discord_profile: SocialLink,
    pub server: ServerCard,
    pub meta: PageMeta,
}

impl HomepageView {
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        let owner = &snapshot.owner;
        let youtube = &snapshot.youtube;
        let discord_id = or_default(&owner.id, defaults::OWNER_DISCORD_ID);

        Self {
            owner: OwnerCard {
                discord_id: discord_id.clone(),
                display_name: or_default(&owner.display_name, defaults::OWNER_DISPLAY_NAME),
                avatar_url: or_default(&owner.avatar_url, defaults::OWNER_AVATAR_URL),
                about: or_default(&owner.about, defaults::OWNER_ABOUT),
                status: owner.status,
            },
            status_badge: owner.status.badge(),
            youtube: SocialLink {
                handle: or_default(&youtube.custom_username, defaults::YOUTUBE_HANDLE),
                url: or_default(&youtube.channel_url, defaults::YOUTUBE_CHANNEL_URL),
            },
            instagram: SocialLink {
                handle: defaults::INSTAGRAM_HANDLE.to_string(),
                url: defaults::INSTAGRAM_URL.to_string(),
            },
            discord_profile: SocialLink {
                handle: or_default(&owner.username, defaults::OWNER_DISPLAY_NAME),
                url: format!("https://discord.com/users/{}", discord_id),
            },
            server: ServerCard::from_snapshot(snapshot),
            meta: PageMeta::from_snapshot(snapshot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub member_count: Stat,
    pub member_count_formatted: Stat,
    pub verified_count: Stat,
    pub verified_count_formatted: Stat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCard {
    pub id: String,
    pub name: String,
    pub url: String,
    pub thumbnail_url: String,
    pub subscriber_count: Stat,
}

impl ChannelCard {
    /// Subscriber line as the portal shows it: "3.8K subs" or "NA".
    pub fn subscribers_label(&self) -> String {
        match self.subscriber_count.as_known() {
            Some(count) => format!("{} subs", count),
            None => self.subscriber_count.display().to_string(),
        }
    }
}

/// The verification portal landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalView {
    pub server: ServerCard,
    pub stats: ServerStats,
    pub youtube_channel: ChannelCard,
    pub meta: PageMeta,
}

impl PortalView {
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        let guild = &snapshot.guild;
        let youtube = &snapshot.youtube;

        Self {
            server: ServerCard::from_snapshot(snapshot),
            stats: ServerStats {
                member_count: guild.member_count.clone(),
                member_count_formatted: guild.members_display(),
                verified_count: guild.verified_user_count.clone(),
                verified_count_formatted: guild.verified_display(),
            },
            youtube_channel: ChannelCard {
                id: or_default(&youtube.channel_id, defaults::YOUTUBE_CHANNEL_ID),
                name: or_default(&youtube.channel_title, defaults::OWNER_DISPLAY_NAME),
                url: or_default(&youtube.channel_url, defaults::YOUTUBE_CHANNEL_URL),
                thumbnail_url: or_default(&youtube.logo_url, defaults::YOUTUBE_LOGO_URL),
                subscriber_count: youtube.subscribers_display(),
            },
            meta: PageMeta::from_snapshot(snapshot),
        }
    }
}
