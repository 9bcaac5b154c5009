//! Timestamp parsing and formatting.
//!
//! Timestamps are wall-clock offsets into the source media. The canonical
//! textual form is `MM:SS` with unbounded minutes (a two hour mark is
//! `125:30`, never wrapped to hours), matching what the analysis prompts
//! request from the model.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Offset into the source media, stored as whole seconds.
///
/// Parses `MM:SS`, `HH:MM:SS` (converted to total minutes), and bare `SS`.
/// Remote models occasionally drift from the requested format, so parsing
/// is lenient about the shape but strict about component ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u32);

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,

    #[error("invalid {component} value: {value}")]
    InvalidValue {
        component: &'static str,
        value: String,
    },

    #[error("seconds component out of range (0-59): {0}")]
    SecondsOutOfRange(u32),

    #[error("minutes component out of range (0-59) in HH:MM:SS form: {0}")]
    MinutesOutOfRange(u32),

    #[error("invalid timestamp format '{0}', expected MM:SS")]
    InvalidFormat(String),
}

impl Timestamp {
    /// Create a timestamp from total seconds.
    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Total seconds since the start of the media.
    pub fn as_secs(&self) -> u32 {
        self.0
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimestampError::Empty);
        }

        let parts: Vec<&str> = s.split(':').collect();
        match parts.len() {
            1 => {
                let secs = parse_seconds_component(parts[0])?;
                Ok(Self(secs))
            }
            2 => {
                let minutes = parse_component("minutes", parts[0])?;
                let secs = parse_seconds_component(parts[1])?;
                if secs > 59 {
                    return Err(TimestampError::SecondsOutOfRange(secs));
                }
                Ok(Self(minutes * 60 + secs))
            }
            3 => {
                let hours = parse_component("hours", parts[0])?;
                let minutes = parse_component("minutes", parts[1])?;
                let secs = parse_seconds_component(parts[2])?;
                if minutes > 59 {
                    return Err(TimestampError::MinutesOutOfRange(minutes));
                }
                if secs > 59 {
                    return Err(TimestampError::SecondsOutOfRange(secs));
                }
                Ok(Self(hours * 3600 + minutes * 60 + secs))
            }
            _ => Err(TimestampError::InvalidFormat(s.to_string())),
        }
    }
}

/// Parse a non-seconds component (hours/minutes) as a whole number.
fn parse_component(component: &'static str, value: &str) -> Result<u32, TimestampError> {
    value.parse().map_err(|_| TimestampError::InvalidValue {
        component,
        value: value.to_string(),
    })
}

/// Parse the seconds component, tolerating a fractional part (`30.500`).
fn parse_seconds_component(value: &str) -> Result<u32, TimestampError> {
    let whole = value.split('.').next().unwrap_or(value);
    whole.parse().map_err(|_| TimestampError::InvalidValue {
        component: "seconds",
        value: value.to_string(),
    })
}

impl fmt::Display for Timestamp {
    /// Canonical `MM:SS` form, minutes unbounded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for Timestamp {
    fn schema_name() -> String {
        "Timestamp".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <String as schemars::JsonSchema>::json_schema(gen)
    }
}
