//! Shared data models for ViralPod backend.
//!
//! This crate provides Serde-serializable types for:
//! - Timestamps in the canonical MM:SS form
//! - Clips, trailer arc entries, short-form candidates
//! - Quality-control issues
//! - The canonical edit report consumed by the presentation layer

pub mod clip;
pub mod report;
pub mod timestamp;

// Re-export common types
pub use clip::{
    Clip, InvalidClipRange, Issue, IssueCategory, NarrativeClip, ShortClip, MAX_VIRALITY_SCORE,
    PLACEHOLDER_DESCRIPTION, PLACEHOLDER_RATIONALE, PLACEHOLDER_ROLE, PLACEHOLDER_TITLE,
};
pub use report::{EditReport, ViewMode};
pub use timestamp::{Timestamp, TimestampError};
