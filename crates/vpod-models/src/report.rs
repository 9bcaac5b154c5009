//! Canonical analysis report.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, Issue, NarrativeClip, ShortClip};

/// The validated, display-ready result of one analysis run.
///
/// Built once per successful analysis and immutable thereafter; a new
/// request produces a new report. All sequences are present even when
/// empty, and preserve the order the agents reported (no re-sorting).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditReport {
    /// Cold-open teaser clips (hook)
    pub teaser_clips: Vec<Clip>,

    /// Trailer story arc
    pub trailer_clips: Vec<NarrativeClip>,

    /// Short-form candidates
    pub short_clips: Vec<ShortClip>,

    /// Quality-control issues
    pub issues: Vec<Issue>,

    /// When the report was produced
    pub created_at: DateTime<Utc>,
}

impl EditReport {
    /// Create a report from agent output.
    pub fn new(
        teaser_clips: Vec<Clip>,
        trailer_clips: Vec<NarrativeClip>,
        short_clips: Vec<ShortClip>,
        issues: Vec<Issue>,
    ) -> Self {
        Self {
            teaser_clips,
            trailer_clips,
            short_clips,
            issues,
            created_at: Utc::now(),
        }
    }

    /// A report with all sequences empty (the remote service returned
    /// nothing usable).
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    /// Whether the remote service produced nothing usable at all.
    pub fn is_empty(&self) -> bool {
        self.teaser_clips.is_empty()
            && self.trailer_clips.is_empty()
            && self.short_clips.is_empty()
            && self.issues.is_empty()
    }
}

/// Which panel the presentation layer should render.
///
/// Supplied by the caller per render; the pipeline itself is request-scoped
/// and holds no view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Creative,
    Technical,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creative" => Ok(Self::Creative),
            "technical" => Ok(Self::Technical),
            other => Err(format!(
                "unknown view mode '{}', expected 'creative' or 'technical'",
                other
            )),
        }
    }
}
