use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lane::Lane;

/// Normalized reading of a free-form feedback vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteSignal {
    Positive,
    Negative,
    Unrecognized,
}

const POSITIVE_TOKENS: &[&str] = &[
    "up", "thumbs_up", "thumbsup", "👍", "+1", "1", "yes", "y", "true", "good", "positive",
    "like",
];
const NEGATIVE_TOKENS: &[&str] = &[
    "down",
    "thumbs_down",
    "thumbsdown",
    "👎",
    "-1",
    "no",
    "n",
    "false",
    "bad",
    "negative",
    "dislike",
];

impl VoteSignal {
    /// Read a vote from whatever encoding the caller stored it in.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Self::Positive,
            Value::Bool(false) => Self::Negative,
            Value::Number(n) => match n.as_f64() {
                Some(v) if v > 0.0 => Self::Positive,
                Some(v) if v < 0.0 => Self::Negative,
                _ => Self::Unrecognized,
            },
            Value::String(s) => Self::from_text(s),
            Value::Null | Value::Array(_) | Value::Object(_) => Self::Unrecognized,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let token = text.trim().to_lowercase();
        if POSITIVE_TOKENS.contains(&token.as_str()) {
            Self::Positive
        } else if NEGATIVE_TOKENS.contains(&token.as_str()) {
            Self::Negative
        } else {
            Self::Unrecognized
        }
    }

    pub fn polarity(self) -> Option<Polarity> {
        match self {
            Self::Positive => Some(Polarity::Positive),
            Self::Negative => Some(Polarity::Negative),
            Self::Unrecognized => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    ExplicitVote,
    CompletedAssignment,
}

/// One observed signal tying a driver to a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEvent {
    pub lane: Lane,
    pub driver_id: String,
    pub polarity: Polarity,
    pub source: EventSource,
}

/// A completed assignment as read from the outcome log.
///
/// Fields are optional because rows written by the surrounding system are
/// not guaranteed to be complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentFact {
    pub load_id: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub driver_id: Option<String>,
}

/// An explicit up/down vote for a driver on a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteFact {
    pub load_id: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub driver_id: Option<String>,
    #[serde(default)]
    pub vote: Value,
}
