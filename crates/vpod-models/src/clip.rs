//! Clip and issue models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timestamp::Timestamp;

/// Rationale used when the model omits one. The display layer never has to
/// special-case a missing key.
pub const PLACEHOLDER_RATIONALE: &str = "No reasoning provided";

/// Narrative role used when the model omits one.
pub const PLACEHOLDER_ROLE: &str = "Clip";

/// Title used when the model omits one.
pub const PLACEHOLDER_TITLE: &str = "Untitled Clip";

/// Issue description used when the model omits one.
pub const PLACEHOLDER_DESCRIPTION: &str = "No description";

/// Canonical virality score ceiling.
pub const MAX_VIRALITY_SCORE: u8 = 10;

/// A clip's start timestamp was after its end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clip start {start} is after end {end}")]
pub struct InvalidClipRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// A time-bounded excerpt of the source media.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Start offset (MM:SS)
    pub start: Timestamp,

    /// End offset (MM:SS)
    pub end: Timestamp,

    /// Transcript of the excerpt
    pub transcript: String,

    /// Editorial reasoning for selecting this excerpt
    pub rationale: String,
}

impl Clip {
    /// Create a clip, enforcing `start <= end`.
    pub fn new(
        start: Timestamp,
        end: Timestamp,
        transcript: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Result<Self, InvalidClipRange> {
        if start > end {
            return Err(InvalidClipRange { start, end });
        }
        Ok(Self {
            start,
            end,
            transcript: transcript.into(),
            rationale: rationale.into(),
        })
    }

    /// Clip duration in seconds.
    pub fn duration_secs(&self) -> u32 {
        self.end.as_secs() - self.start.as_secs()
    }
}

/// A trailer clip with its role in the story arc.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NarrativeClip {
    #[serde(flatten)]
    pub clip: Clip,

    /// Role in the trailer arc (e.g. "Conflict", "Climax")
    pub narrative_role: String,
}

/// A standalone short-form candidate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShortClip {
    #[serde(flatten)]
    pub clip: Clip,

    /// Suggested title
    pub title: String,

    /// Virality score on the canonical 0-10 scale
    pub virality_score: u8,
}

/// Category of a quality-control issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Dead air longer than the configured threshold
    Silence,
    /// Coughing, sneezing, throat clearing
    Disfluency,
    /// Spoken editing directive ("cut this", "start over")
    EditorCommand,
    #[serde(other)]
    Other,
}

impl IssueCategory {
    /// Classify a free-text label reported by the technical agent.
    ///
    /// The agent is asked for "Silence/Cough/Command" style labels but is
    /// only weakly obligated to comply, so matching is by substring.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("silence") || label.contains("dead air") {
            Self::Silence
        } else if label.contains("cough")
            || label.contains("sneez")
            || label.contains("throat")
            || label.contains("disturbance")
        {
            Self::Disfluency
        } else if label.contains("command")
            || label.contains("cut")
            || label.contains("mistake")
            || label.contains("start over")
        {
            Self::EditorCommand
        } else {
            Self::Other
        }
    }
}

/// A quality-control issue flagged by the technical agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    /// Start of the affected range (MM:SS)
    pub start: Timestamp,

    /// End of the affected range (MM:SS)
    pub end: Timestamp,

    /// Issue category
    pub category: IssueCategory,

    /// Description of what to fix
    pub description: String,
}
