//! Types for transcript analysis and parsing of raw model output.
//!
//! Model output is untrusted. It is parsed against an explicit schema where every
//! field has a default, then normalized: topic importance is clamped to 1-5, unknown
//! action item priorities become medium, and speaker name entries without both a name
//! and an index are dropped. A response with no usable JSON degrades to a summary-only
//! analysis holding the raw text.

use crate::Error;
use entity::analysis_items::{
    ActionItem, KeyPoint, Priority, SpeakerName, Topic, MAX_IMPORTANCE, MIN_IMPORTANCE,
};
use entity::language::Language;
use log::*;
use serde::Deserialize;
use serde_json::Value;

/// Importance given to a topic the model did not score.
pub const DEFAULT_IMPORTANCE: u8 = 3;

/// Input for an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Transcript rendered with speaker prefixes
    pub transcript_text: String,
    pub language: Language,
    pub custom_instructions: Option<String>,
}

/// A normalized analysis result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    pub summary: String,
    pub topics: Vec<Topic>,
    pub key_points: Vec<KeyPoint>,
    pub action_items: Vec<ActionItem>,
    pub speaker_names: Vec<SpeakerName>,
    pub meeting_document: String,
    pub raw_response: String,
}

impl Analysis {
    /// Summary-only analysis used when the model output could not be parsed.
    pub fn fallback(raw_response: &str) -> Self {
        Analysis {
            summary: raw_response.trim().to_string(),
            raw_response: raw_response.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    summary: Option<String>,
    topics: Vec<RawTopic>,
    key_points: Vec<RawKeyPoint>,
    action_items: Vec<RawActionItem>,
    speaker_names: Vec<RawSpeakerName>,
    meeting_document: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawTopic {
    title: Option<String>,
    description: Option<String>,
    importance: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawKeyPoint {
    point: Option<String>,
    context: Option<String>,
    speaker: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawActionItem {
    item: Option<String>,
    assignee: Option<String>,
    priority: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawSpeakerName {
    #[serde(alias = "speaker", alias = "index")]
    speaker_index: Option<Value>,
    name: Option<String>,
}

/// Parses a raw model response, falling back to [`Analysis::fallback`] when it holds
/// no usable JSON object. Never fails.
pub fn parse_analysis_response(raw_response: &str) -> Analysis {
    match try_parse_analysis_response(raw_response) {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!("{err}; falling back to a summary-only analysis");
            Analysis::fallback(raw_response)
        }
    }
}

/// Strict variant of [`parse_analysis_response`] that reports why parsing failed.
pub fn try_parse_analysis_response(raw_response: &str) -> Result<Analysis, Error> {
    let json = extract_json_object(raw_response).ok_or_else(|| {
        Error::AnalysisParse("no JSON object found in the model response".to_string())
    })?;

    let raw: RawAnalysis =
        serde_json::from_str(json).map_err(|e| Error::AnalysisParse(e.to_string()))?;

    Ok(normalize(raw, raw_response))
}

fn normalize(raw: RawAnalysis, raw_response: &str) -> Analysis {
    let topics = raw
        .topics
        .into_iter()
        .filter_map(|topic| {
            let title = non_blank(topic.title)?;
            Some(Topic {
                title,
                description: topic.description.unwrap_or_default().trim().to_string(),
                importance: normalize_importance(topic.importance.as_ref()),
            })
        })
        .collect();

    let key_points = raw
        .key_points
        .into_iter()
        .filter_map(|key_point| {
            Some(KeyPoint {
                point: non_blank(key_point.point)?,
                context: non_blank(key_point.context),
                speaker: key_point.speaker.as_ref().and_then(value_to_label),
            })
        })
        .collect();

    let action_items = raw
        .action_items
        .into_iter()
        .filter_map(|action_item| {
            Some(ActionItem {
                item: non_blank(action_item.item)?,
                assignee: non_blank(action_item.assignee),
                priority: Priority::from_loose(action_item.priority.as_deref()),
            })
        })
        .collect();

    let speaker_names = raw
        .speaker_names
        .into_iter()
        .filter_map(|speaker_name| {
            Some(SpeakerName {
                speaker_index: speaker_name.speaker_index.as_ref().and_then(value_to_index)?,
                name: non_blank(speaker_name.name)?,
            })
        })
        .collect();

    Analysis {
        summary: raw.summary.unwrap_or_default().trim().to_string(),
        topics,
        key_points,
        action_items,
        speaker_names,
        meeting_document: raw.meeting_document.unwrap_or_default(),
        raw_response: raw_response.to_string(),
    }
}

/// Clamps an importance score into `[MIN_IMPORTANCE, MAX_IMPORTANCE]`. Numbers may
/// arrive as JSON numbers or numeric strings; anything else gets the default.
pub fn normalize_importance(value: Option<&Value>) -> u8 {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match score {
        Some(score) if score.is_finite() => {
            score
                .round()
                .clamp(MIN_IMPORTANCE as f64, MAX_IMPORTANCE as f64) as u8
        }
        _ => DEFAULT_IMPORTANCE,
    }
}

/// Returns the first balanced `{ ... }` span in `text` that parses as a JSON object,
/// skipping braces that appear inside JSON strings. Surrounding prose, Markdown code
/// fences and stray braces such as `{name}` ahead of the object are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|(_, ch)| *ch == '{')
        .filter_map(|(start, _)| balanced_span(&text[start..]))
        .find(|candidate| {
            serde_json::from_str::<Value>(candidate).is_ok_and(|value| value.is_object())
        })
}

/// The balanced `{ ... }` prefix of `text`, which must start with `{`.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn value_to_index(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        // Models sometimes echo the transcript prefix, ex. "Speaker 2"
        Value::String(s) => s
            .trim()
            .trim_start_matches("Speaker")
            .trim()
            .parse::<i32>()
            .ok(),
        _ => None,
    }
    .filter(|index| *index >= 0)
}

fn value_to_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s.clone())),
        Value::Number(n) => Some(format!("Speaker {n}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn importance_is_clamped_into_range() {
        assert_eq!(normalize_importance(Some(&json!(9))), 5);
        assert_eq!(normalize_importance(Some(&json!(-1))), 1);
        assert_eq!(normalize_importance(Some(&json!(4))), 4);
        assert_eq!(normalize_importance(Some(&json!("2"))), 2);
    }

    #[test]
    fn missing_or_garbage_importance_gets_the_default() {
        assert_eq!(normalize_importance(None), DEFAULT_IMPORTANCE);
        assert_eq!(normalize_importance(Some(&json!("very"))), DEFAULT_IMPORTANCE);
        assert_eq!(normalize_importance(Some(&json!(null))), DEFAULT_IMPORTANCE);
    }

    #[test]
    fn extracts_json_from_a_code_fence() {
        let text = "Here you go:\n```json\n{\"summary\": \"ok\"}\n```\nThanks";
        assert_eq!(extract_json_object(text), Some("{\"summary\": \"ok\"}"));
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_object() {
        let text = r#"{"summary": "use } carefully \" {", "topics": []} trailing }"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"summary": "use } carefully \" {", "topics": []}"#)
        );
    }

    #[test]
    fn skips_brace_spans_in_prose_that_are_not_json() {
        let text = "Placeholders like {name} were replaced.\n```json\n{\"summary\": \"Real summary\"}\n```";
        assert_eq!(
            extract_json_object(text),
            Some("{\"summary\": \"Real summary\"}")
        );
    }

    #[test]
    fn extract_json_object_returns_none_without_an_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{ unbalanced"), None);
    }

    #[test]
    fn parses_a_response_wrapped_in_prose() {
        let raw = r#"Sure! Here is the analysis:
```json
{
  "summary": "Planning the Q3 launch.",
  "topics": [
    {"title": "Launch", "description": "Dates", "importance": 9},
    {"title": "Budget", "description": "Costs", "importance": -1},
    {"title": "Hiring", "description": "Roles"}
  ],
  "keyPoints": [{"point": "Launch moves to July", "speaker": "Ada"}],
  "actionItems": [
    {"item": "Draft press release", "assignee": "Ada", "priority": "high"},
    {"item": "Book venue"}
  ],
  "speakerNames": [
    {"speakerIndex": 0, "name": "Ada"},
    {"speakerIndex": 1},
    {"name": "Nobody"}
  ],
  "meetingDocument": "Launch plan"
}
```"#;

        let analysis = parse_analysis_response(raw);

        assert_eq!(analysis.summary, "Planning the Q3 launch.");
        let importance: Vec<u8> = analysis.topics.iter().map(|t| t.importance).collect();
        assert_eq!(importance, vec![5, 1, 3]);
        assert_eq!(analysis.key_points[0].speaker.as_deref(), Some("Ada"));
        assert_eq!(analysis.action_items[0].priority, Priority::High);
        assert_eq!(analysis.action_items[1].priority, Priority::Medium);
        assert_eq!(
            analysis.speaker_names,
            vec![SpeakerName {
                speaker_index: 0,
                name: "Ada".to_string()
            }]
        );
        assert_eq!(analysis.meeting_document, "Launch plan");
        assert_eq!(analysis.raw_response, raw);
    }

    #[test]
    fn response_without_json_falls_back_to_raw_summary() {
        let raw = "The model only wrote prose this time.";
        let analysis = parse_analysis_response(raw);

        assert_eq!(analysis.summary, raw);
        assert!(analysis.topics.is_empty());
        assert!(analysis.key_points.is_empty());
        assert!(analysis.action_items.is_empty());
        assert!(analysis.speaker_names.is_empty());
    }

    #[test]
    fn invalid_json_is_reported_by_the_strict_parser() {
        let raw = r#"{"summary": "ok", "topics": "not a list"}"#;
        assert!(matches!(
            try_parse_analysis_response(raw),
            Err(Error::AnalysisParse(_))
        ));
        assert_eq!(parse_analysis_response(raw).summary, raw);
    }

    #[test]
    fn speaker_index_accepts_transcript_prefix_strings() {
        assert_eq!(value_to_index(&json!("Speaker 2")), Some(2));
        assert_eq!(value_to_index(&json!(1)), Some(1));
        assert_eq!(value_to_index(&json!(-3)), None);
    }
}
