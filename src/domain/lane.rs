use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel endpoint for places that cannot be resolved.
pub const UNKNOWN_ENDPOINT: &str = "UNKNOWN";

/// Separator between origin and destination inside a lane key.
pub const LANE_KEY_SEPARATOR: &str = " -> ";

const PLACEHOLDERS: &[&str] = &["unknown", "n/a", "na", "none", "null", "tbd", "-", "?"];

/// Normalize a free-text place description into its canonical form.
///
/// `"  birmingham ,  al "` becomes `"BIRMINGHAM, AL"`. Missing, blank, or
/// placeholder values become [`UNKNOWN_ENDPOINT`]. Arrows are replaced by
/// spaces so an endpoint can never contain [`LANE_KEY_SEPARATOR`].
pub fn normalize_place(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNKNOWN_ENDPOINT.to_string();
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed.to_lowercase().as_str()) {
        return UNKNOWN_ENDPOINT.to_string();
    }

    let parts: Vec<String> = trimmed
        .split(',')
        .map(|part| {
            part.replace("->", " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_uppercase()
        })
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return UNKNOWN_ENDPOINT.to_string();
    }
    parts.join(", ")
}

/// A normalized origin/destination pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lane {
    origin_key: String,
    destination_key: String,
}

impl Lane {
    pub fn from_places(origin: Option<&str>, destination: Option<&str>) -> Self {
        Self {
            origin_key: normalize_place(origin),
            destination_key: normalize_place(destination),
        }
    }

    pub fn origin_key(&self) -> &str {
        &self.origin_key
    }

    pub fn destination_key(&self) -> &str {
        &self.destination_key
    }

    /// False when either endpoint is the UNKNOWN sentinel.
    pub fn is_resolved(&self) -> bool {
        self.origin_key != UNKNOWN_ENDPOINT && self.destination_key != UNKNOWN_ENDPOINT
    }

    pub fn key(&self) -> LaneKey {
        LaneKey(format!(
            "{}{LANE_KEY_SEPARATOR}{}",
            self.origin_key, self.destination_key
        ))
    }
}

/// Grouping key for affinity statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneKey(String);

impl LaneKey {
    /// Wrap an already-normalized key, e.g. one read back from storage.
    pub fn from_normalized(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
