//! Minimal report rendering for the CLI.

use serde_json::json;

use vpod_models::{EditReport, ViewMode};

/// Render the whole report, or one panel of it, as pretty JSON.
///
/// The view mode is supplied by the caller per render; nothing here is
/// stateful.
pub fn render_report(report: &EditReport, view: Option<ViewMode>) -> String {
    let value = match view {
        None => serde_json::to_value(report).unwrap_or_default(),
        Some(ViewMode::Creative) => json!({
            "teaser_clips": report.teaser_clips,
            "trailer_clips": report.trailer_clips,
            "short_clips": report.short_clips,
        }),
        Some(ViewMode::Technical) => json!({
            "issues": report.issues,
        }),
    };
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
