use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Discord presence of the profile owner.
///
/// Anything outside the known set (including the `"NA"` sentinel) is
/// `Unknown`, which displays exactly like `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    Offline,
    #[default]
    Unknown,
}

impl PresenceStatus {
    /// Case-insensitive; never fails.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => PresenceStatus::Online,
            "idle" => PresenceStatus::Idle,
            "dnd" => PresenceStatus::Dnd,
            "offline" => PresenceStatus::Offline,
            _ => PresenceStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Idle => "idle",
            PresenceStatus::Dnd => "dnd",
            PresenceStatus::Offline => "offline",
            PresenceStatus::Unknown => super::NA,
        }
    }

    /// Badge shown next to the avatar. Offline and unknown show nothing.
    pub fn badge(&self) -> Option<StatusBadge> {
        let (label, color) = match self {
            PresenceStatus::Online => ("Online", BadgeColor::Green),
            PresenceStatus::Idle => ("Idle", BadgeColor::Yellow),
            PresenceStatus::Dnd => ("DND", BadgeColor::Red),
            PresenceStatus::Offline | PresenceStatus::Unknown => return None,
        };
        Some(StatusBadge {
            status: *self,
            label,
            color,
        })
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresenceStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for PresenceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PresenceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(|value| value.as_str())
            .map(PresenceStatus::parse)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub status: PresenceStatus,
    pub label: &'static str,
    pub color: BadgeColor,
}
