//! Dual-agent analysis orchestration.
//!
//! Issues the creative and technical prompts against the same remote file,
//! parses each JSON response defensively, and merges the two partial
//! reports into the canonical [`EditReport`]. A failed or unparseable
//! response degrades to an empty partial for that agent only; the other
//! agent's data still populates the report.

use serde_json::{Map, Value};
use tracing::warn;

use vpod_gemini::{GeminiClient, GeminiResult, RemoteFile};
use vpod_models::{
    Clip, EditReport, Issue, IssueCategory, NarrativeClip, ShortClip, Timestamp,
    MAX_VIRALITY_SCORE, PLACEHOLDER_DESCRIPTION, PLACEHOLDER_RATIONALE, PLACEHOLDER_ROLE,
    PLACEHOLDER_TITLE,
};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::prompts;

/// Run both agents against a ready remote file and merge their reports.
///
/// The two requests share no data, so they are issued concurrently and
/// awaited together before merging.
pub async fn analyze(
    client: &GeminiClient,
    file: &RemoteFile,
    config: &PipelineConfig,
) -> PipelineResult<EditReport> {
    let creative_prompt = prompts::creative_prompt();
    let technical_prompt = prompts::technical_prompt(config.silence_threshold_secs);

    let (creative_response, technical_response) = tokio::join!(
        client.generate(file, &creative_prompt),
        client.generate(file, &technical_prompt),
    );

    let creative = partial_from_response("creative", creative_response);
    let technical = partial_from_response("technical", technical_response);

    let merged = merge_partials(creative, technical);
    Ok(build_report(&merged))
}

/// Degrade a failed request to an empty partial; parse a successful one.
fn partial_from_response(agent: &str, response: GeminiResult<String>) -> Map<String, Value> {
    match response {
        Ok(text) => parse_partial(agent, &text),
        Err(e) => {
            warn!(agent, error = %e, "Agent request failed, degrading to empty partial report");
            Map::new()
        }
    }
}

/// Parse one agent's raw response text into a partial report object.
///
/// Markdown code fences are tolerated; anything that isn't a JSON object
/// degrades to an empty partial with a warning.
pub(crate) fn parse_partial(agent: &str, text: &str) -> Map<String, Value> {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(agent, "Agent returned non-object JSON, degrading to empty partial report");
            Map::new()
        }
        Err(e) => {
            warn!(agent, error = %e, "Agent returned unparseable JSON, degrading to empty partial report");
            Map::new()
        }
    }
}

/// Field-union of the two partial reports; on an overlapping key the
/// second (technical) report wins. The two prompts populate disjoint
/// field sets by design, so overlap is unexpected but harmless.
pub(crate) fn merge_partials(
    first: Map<String, Value>,
    second: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = first;
    for (key, value) in second {
        merged.insert(key, value);
    }
    merged
}

/// Coerce the merged partials into the canonical report shape.
///
/// Every field access is optional-with-default; entries with missing or
/// reversed timestamps are dropped with a warning.
pub(crate) fn build_report(merged: &Map<String, Value>) -> EditReport {
    EditReport::new(
        collect(merged, "cold_open_clips", clip_from_value),
        collect(merged, "trailer_structure", narrative_from_value),
        collect(merged, "viral_shorts", short_from_value),
        collect(merged, "mistakes_log", issue_from_value),
    )
}

fn collect<T>(
    merged: &Map<String, Value>,
    key: &str,
    coerce: fn(&Value) -> Option<T>,
) -> Vec<T> {
    merged
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(coerce).collect())
        .unwrap_or_default()
}

fn clip_from_value(value: &Value) -> Option<Clip> {
    let start = timestamp_field(value, "start")?;
    let end = timestamp_field(value, "end")?;
    let transcript = str_field(value, &["text", "transcript"], "");
    let rationale = str_field(value, &["reason", "wisdom", "rationale"], PLACEHOLDER_RATIONALE);

    match Clip::new(start, end, transcript, rationale) {
        Ok(clip) => Some(clip),
        Err(e) => {
            warn!(error = %e, "Dropping clip with reversed time range");
            None
        }
    }
}

fn narrative_from_value(value: &Value) -> Option<NarrativeClip> {
    let clip = clip_from_value(value)?;
    Some(NarrativeClip {
        clip,
        narrative_role: str_field(value, &["narrative_role", "role"], PLACEHOLDER_ROLE),
    })
}

fn short_from_value(value: &Value) -> Option<ShortClip> {
    let clip = clip_from_value(value)?;
    Some(ShortClip {
        clip,
        title: str_field(value, &["title"], PLACEHOLDER_TITLE),
        virality_score: parse_virality_score(value),
    })
}

fn issue_from_value(value: &Value) -> Option<Issue> {
    let start = timestamp_field(value, "start")?;
    let end = timestamp_field(value, "end")?;
    if start > end {
        warn!(%start, %end, "Dropping issue with reversed time range");
        return None;
    }
    let label = str_field(value, &["error_type", "category", "type"], "");
    Some(Issue {
        start,
        end,
        category: IssueCategory::from_label(&label),
        description: str_field(value, &["description"], PLACEHOLDER_DESCRIPTION),
    })
}

/// First non-empty string among the aliased keys, or the default.
fn str_field(value: &Value, keys: &[&str], default: &str) -> String {
    for key in keys {
        if let Some(s) = value.get(*key).and_then(Value::as_str) {
            let s = s.trim();
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    default.to_string()
}

fn timestamp_field(value: &Value, key: &str) -> Option<Timestamp> {
    let raw = value.get(key).and_then(Value::as_str)?;
    match raw.parse() {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!(raw, error = %e, "Dropping entry with invalid timestamp");
            None
        }
    }
}

/// Canonicalize a reported virality score onto the 0-10 scale.
///
/// Accepts bare numbers, "9/10" style strings, and 0-100 scale values
/// (scaled down by ten).
pub(crate) fn parse_virality_score(value: &Value) -> u8 {
    let raw = value.get("virality_score").or_else(|| value.get("score"));

    let score = match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s
            .split('/')
            .next()
            .unwrap_or("")
            .trim()
            .parse::<f64>()
            .unwrap_or(0.0),
        _ => 0.0,
    };

    let score = if score > MAX_VIRALITY_SCORE as f64 {
        score / 10.0
    } else {
        score
    };
    score.round().clamp(0.0, MAX_VIRALITY_SCORE as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    const TECHNICAL_RESPONSE: &str = r#"{
        "mistakes_log": [
            {"start": "05:00", "end": "05:09", "error_type": "Silence", "description": "Dead air"},
            {"start": "21:14", "end": "21:16", "error_type": "Cough"}
        ]
    }"#;

    #[test]
    fn test_parse_partial_plain_and_fenced() {
        let plain = parse_partial("technical", TECHNICAL_RESPONSE);
        assert!(plain.contains_key("mistakes_log"));

        let fenced = format!("```json\n{}\n```", TECHNICAL_RESPONSE);
        let parsed = parse_partial("technical", &fenced);
        assert!(parsed.contains_key("mistakes_log"));
    }

    #[test]
    fn test_parse_partial_degrades_on_garbage() {
        assert!(parse_partial("creative", "not json at all").is_empty());
        assert!(parse_partial("creative", "[1, 2, 3]").is_empty());
        assert!(parse_partial("creative", "").is_empty());
    }

    #[test]
    fn test_merge_is_commutative_on_disjoint_fields() {
        let a = to_map(json!({"cold_open_clips": [1]}));
        let b = to_map(json!({"mistakes_log": [2]}));

        let ab = merge_partials(a.clone(), b.clone());
        let ba = merge_partials(b, a);
        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 2);
    }

    #[test]
    fn test_merge_last_writer_wins_on_overlap() {
        let first = to_map(json!({"mistakes_log": ["creative"]}));
        let second = to_map(json!({"mistakes_log": ["technical"]}));

        let merged = merge_partials(first, second);
        assert_eq!(merged["mistakes_log"], json!(["technical"]));
    }

    #[test]
    fn test_malformed_creative_still_populates_issues() {
        // Creative agent returned garbage, technical agent returned valid
        // JSON: the report degrades to empty creative sequences only.
        let creative = parse_partial("creative", "{{{ definitely not json");
        let technical = parse_partial("technical", TECHNICAL_RESPONSE);

        let report = build_report(&merge_partials(creative, technical));

        assert!(report.teaser_clips.is_empty());
        assert!(report.trailer_clips.is_empty());
        assert!(report.short_clips.is_empty());
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].category, IssueCategory::Silence);
        assert_eq!(report.issues[0].description, "Dead air");
        // Missing description gets the placeholder, never absent
        assert_eq!(report.issues[1].description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(report.issues[1].category, IssueCategory::Disfluency);
    }

    #[test]
    fn test_missing_rationale_gets_placeholder() {
        let merged = to_map(json!({
            "cold_open_clips": [
                {"start": "42:10", "end": "42:31", "text": "the claim"},
                {"start": "10:00", "end": "10:20", "text": "other", "reason": "strong hook"}
            ]
        }));

        let report = build_report(&merged);

        assert_eq!(report.teaser_clips.len(), 2);
        assert_eq!(report.teaser_clips[0].rationale, PLACEHOLDER_RATIONALE);
        assert_eq!(report.teaser_clips[1].rationale, "strong hook");
    }

    #[test]
    fn test_wisdom_alias_is_honored() {
        let merged = to_map(json!({
            "cold_open_clips": [
                {"start": "01:00", "end": "01:10", "text": "t", "wisdom": "from the old key"}
            ]
        }));
        let report = build_report(&merged);
        assert_eq!(report.teaser_clips[0].rationale, "from the old key");
    }

    #[test]
    fn test_reversed_and_invalid_entries_are_dropped() {
        let merged = to_map(json!({
            "cold_open_clips": [
                {"start": "10:00", "end": "05:00", "text": "reversed"},
                {"start": "oops", "end": "05:00", "text": "bad start"},
                {"start": "02:00", "end": "03:00", "text": "kept", "reason": "r"}
            ]
        }));

        let report = build_report(&merged);
        assert_eq!(report.teaser_clips.len(), 1);
        assert_eq!(report.teaser_clips[0].transcript, "kept");
    }

    #[test]
    fn test_trailer_and_shorts_coercion() {
        let merged = to_map(json!({
            "trailer_structure": [
                {"start": "12:00", "end": "12:20", "text": "conflict", "narrative_role": "Conflict", "reason": "r"},
                {"start": "30:00", "end": "30:15", "text": "no role"}
            ],
            "viral_shorts": [
                {"start": "33:05", "end": "33:50", "title": "The Take", "text": "t", "virality_score": "9/10", "reason": "r"},
                {"start": "40:00", "end": "40:30", "text": "untitled"}
            ]
        }));

        let report = build_report(&merged);

        assert_eq!(report.trailer_clips[0].narrative_role, "Conflict");
        assert_eq!(report.trailer_clips[1].narrative_role, PLACEHOLDER_ROLE);
        assert_eq!(report.short_clips[0].virality_score, 9);
        assert_eq!(report.short_clips[1].title, PLACEHOLDER_TITLE);
        assert_eq!(report.short_clips[1].virality_score, 0);
    }

    #[test]
    fn test_virality_score_canonicalization() {
        let score = |v: Value| parse_virality_score(&json!({ "virality_score": v }));

        assert_eq!(score(json!(9)), 9);
        assert_eq!(score(json!(9.4)), 9);
        assert_eq!(score(json!("9/10")), 9);
        assert_eq!(score(json!("7")), 7);
        // 0-100 scale inputs collapse onto 0-10
        assert_eq!(score(json!(80)), 8);
        assert_eq!(score(json!("85/100")), 9);
        // Garbage floors to zero
        assert_eq!(score(json!("viral!")), 0);
        assert_eq!(parse_virality_score(&json!({})), 0);
        // Legacy "score" key
        assert_eq!(parse_virality_score(&json!({"score": 6})), 6);
    }

    #[test]
    fn test_empty_merge_builds_empty_report() {
        let report = build_report(&Map::new());
        assert!(report.is_empty());
    }
}
