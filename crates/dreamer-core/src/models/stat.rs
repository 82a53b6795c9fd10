use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::utils::format::compact_count;

/// Sentinel the backend sends (and we send back) for unknown values.
pub const NA: &str = "NA";

/// A value that is either known or carries the `"NA"` sentinel.
///
/// The backend is loose about these fields: counters arrive as strings or
/// bare numbers, and unknown values show up as `"NA"`, `"N/A"`, `""`,
/// `null`, or not at all. All of the unknown spellings collapse into
/// [`Stat::Unknown`] so display code has exactly one case to handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stat {
    Known(String),
    #[default]
    Unknown,
}

impl Stat {
    /// Build a stat from a raw string, normalizing the unknown spellings.
    /// Known values are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case(NA)
            || trimmed.eq_ignore_ascii_case("N/A")
        {
            Stat::Unknown
        } else {
            Stat::Known(raw.to_string())
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Stat::Known(_))
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            Stat::Known(value) => Some(value),
            Stat::Unknown => None,
        }
    }

    /// The value for display, `"NA"` when unknown.
    pub fn display(&self) -> &str {
        self.display_or(NA)
    }

    pub fn display_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.as_known().unwrap_or(default)
    }

    /// Interpret the value as a plain counter ("1234", "1,234").
    pub fn as_count(&self) -> Option<u64> {
        let digits: String = self.as_known()?.trim().chars().filter(|c| *c != ',').collect();
        digits.parse().ok()
    }

    /// Resolve a raw/formatted counter pair to the formatted side.
    ///
    /// Prefers the backend's own formatting; when only the raw number is
    /// known it is rendered compactly (`1234` -> `"1.2K"`).
    pub fn formatted_pair(raw: &Stat, formatted: &Stat) -> Stat {
        if formatted.is_known() {
            return formatted.clone();
        }
        match raw.as_count() {
            Some(count) => Stat::Known(compact_count(count)),
            None => Stat::Unknown,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

impl From<&str> for Stat {
    fn from(value: &str) -> Self {
        Stat::parse(value)
    }
}

impl From<u64> for Stat {
    fn from(value: u64) -> Self {
        Stat::Known(value.to_string())
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display())
    }
}

impl<'de> Deserialize<'de> for Stat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatVisitor)
    }
}

struct StatVisitor;

impl<'de> Visitor<'de> for StatVisitor {
    type Value = Stat;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a number, or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Stat, E> {
        Ok(Stat::parse(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Stat, E> {
        Ok(Stat::Known(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Stat, E> {
        Ok(Stat::Known(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Stat, E> {
        if v.is_finite() {
            Ok(Stat::Known(v.to_string()))
        } else {
            Ok(Stat::Unknown)
        }
    }

    fn visit_none<E: de::Error>(self) -> Result<Stat, E> {
        Ok(Stat::Unknown)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Stat, E> {
        Ok(Stat::Unknown)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Stat, D::Error> {
        deserializer.deserialize_any(StatVisitor)
    }
}
