//! Renders a processed meeting into a self-contained Markdown or HTML document.

use crate::error::Error;
use crate::transcript::{self, Transcript};
use crate::{analyses, meetings};
use entity_api::analysis;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::fmt::Write;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }
}

/// Everything that goes into an export. Analysis and transcript are absent until the
/// meeting has been processed.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub meeting: meetings::Model,
    pub analysis: Option<analyses::Model>,
    pub transcript: Option<Transcript>,
}

impl ExportDocument {
    /// Collects the stored results of `meeting`.
    pub async fn load(db: &DatabaseConnection, meeting: meetings::Model) -> Result<Self, Error> {
        let analysis = analysis::find_by_meeting_id(db, meeting.id).await?;
        let transcript = match transcript::find_by_meeting_id(db, meeting.id).await {
            Ok(transcript) => Some(transcript),
            Err(e) if e.error_kind == Error::not_found().error_kind => None,
            Err(e) => return Err(e),
        };
        Ok(Self {
            meeting,
            analysis,
            transcript,
        })
    }

    pub fn render(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Markdown => to_markdown(self),
            ExportFormat::Html => to_html(self),
        }
    }

    /// A filesystem friendly name such as `weekly-sync.md`.
    pub fn filename(&self, format: ExportFormat) -> String {
        let slug: String = self
            .meeting
            .title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        let slug = if slug.is_empty() {
            "meeting".to_string()
        } else {
            slug
        };
        format!("{slug}.{}", format.file_extension())
    }
}

/// Formats an offset as `mm:ss`, or `h:mm:ss` past the first hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

fn format_duration(seconds: Option<f64>) -> String {
    seconds.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn to_markdown(doc: &ExportDocument) -> String {
    let meeting = &doc.meeting;
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", meeting.title);
    let _ = writeln!(out, "- **Date:** {}", meeting.created_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "- **Duration:** {}", format_duration(meeting.duration_seconds));
    let _ = writeln!(out, "- **Language:** {}", meeting.language.name());
    if let Some(description) = meeting.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out, "\n{description}");
    }

    if let Some(analysis) = &doc.analysis {
        let _ = writeln!(out, "\n## Summary\n\n{}", analysis.summary);

        if !analysis.topics.0.is_empty() {
            let _ = writeln!(out, "\n## Topics\n");
            for topic in &analysis.topics.0 {
                let _ = writeln!(
                    out,
                    "- **{}** ({}/5): {}",
                    topic.title, topic.importance, topic.description
                );
            }
        }

        if !analysis.key_points.0.is_empty() {
            let _ = writeln!(out, "\n## Key Points\n");
            for key_point in &analysis.key_points.0 {
                let mut line = format!("- {}", key_point.point);
                if let Some(speaker) = &key_point.speaker {
                    let _ = write!(line, " ({speaker})");
                }
                if let Some(context) = &key_point.context {
                    let _ = write!(line, ": {context}");
                }
                let _ = writeln!(out, "{line}");
            }
        }

        if !analysis.action_items.0.is_empty() {
            let _ = writeln!(out, "\n## Action Items\n");
            for action_item in &analysis.action_items.0 {
                let assignee = action_item
                    .assignee
                    .as_deref()
                    .map(|a| format!(" @{a}"))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "- [ ] {}{} [{}]",
                    action_item.item, assignee, action_item.priority
                );
            }
        }

        if !analysis.meeting_document.trim().is_empty() {
            let _ = writeln!(out, "\n## Meeting Document\n\n{}", analysis.meeting_document.trim());
        }
    }

    if let Some(transcript) = &doc.transcript {
        let _ = writeln!(out, "\n## Transcript\n");
        for utterance in &transcript.utterances {
            let _ = writeln!(
                out,
                "**[{}] {}:** {}\n",
                format_timestamp(utterance.start_seconds),
                utterance.speaker_label,
                utterance.text
            );
        }
    }

    out
}

const HTML_STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;\
padding:0 1rem;line-height:1.5;color:#1f2937}h1{margin-bottom:.25rem}.meta{color:#6b7280}\
.utterance{margin:.5rem 0}.time{color:#6b7280;font-variant-numeric:tabular-nums}\
.priority{font-size:.8rem;text-transform:uppercase;color:#6b7280}\
pre{white-space:pre-wrap;font-family:inherit}";

pub fn to_html(doc: &ExportDocument) -> String {
    let meeting = &doc.meeting;
    let title = escape_html(&meeting.title);
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{HTML_STYLE}</style>\n</head>\n<body>\n",
        meeting.language.code()
    );
    let _ = writeln!(out, "<h1>{title}</h1>");
    let _ = writeln!(
        out,
        "<p class=\"meta\">{} &middot; {} &middot; {}</p>",
        meeting.created_at.format("%Y-%m-%d %H:%M"),
        format_duration(meeting.duration_seconds),
        meeting.language.name()
    );
    if let Some(description) = meeting.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out, "<p>{}</p>", escape_html(description));
    }

    if let Some(analysis) = &doc.analysis {
        let _ = writeln!(out, "<h2>Summary</h2>\n<p>{}</p>", escape_html(&analysis.summary));

        if !analysis.topics.0.is_empty() {
            let _ = writeln!(out, "<h2>Topics</h2>\n<ul>");
            for topic in &analysis.topics.0 {
                let _ = writeln!(
                    out,
                    "<li><strong>{}</strong> ({}/5): {}</li>",
                    escape_html(&topic.title),
                    topic.importance,
                    escape_html(&topic.description)
                );
            }
            let _ = writeln!(out, "</ul>");
        }

        if !analysis.key_points.0.is_empty() {
            let _ = writeln!(out, "<h2>Key Points</h2>\n<ul>");
            for key_point in &analysis.key_points.0 {
                let speaker = key_point
                    .speaker
                    .as_deref()
                    .map(|s| format!(" <em>({})</em>", escape_html(s)))
                    .unwrap_or_default();
                let context = key_point
                    .context
                    .as_deref()
                    .map(|c| format!(": {}", escape_html(c)))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "<li>{}{speaker}{context}</li>",
                    escape_html(&key_point.point)
                );
            }
            let _ = writeln!(out, "</ul>");
        }

        if !analysis.action_items.0.is_empty() {
            let _ = writeln!(out, "<h2>Action Items</h2>\n<ul>");
            for action_item in &analysis.action_items.0 {
                let assignee = action_item
                    .assignee
                    .as_deref()
                    .map(|a| format!(" &mdash; {}", escape_html(a)))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "<li>{}{assignee} <span class=\"priority\">{}</span></li>",
                    escape_html(&action_item.item),
                    action_item.priority
                );
            }
            let _ = writeln!(out, "</ul>");
        }

        if !analysis.meeting_document.trim().is_empty() {
            let _ = writeln!(
                out,
                "<h2>Meeting Document</h2>\n<pre>{}</pre>",
                escape_html(analysis.meeting_document.trim())
            );
        }
    }

    if let Some(transcript) = &doc.transcript {
        let _ = writeln!(out, "<h2>Transcript</h2>");
        for utterance in &transcript.utterances {
            let _ = writeln!(
                out,
                "<p class=\"utterance\"><span class=\"time\">[{}]</span> <strong style=\"color:{}\">{}</strong>: {}</p>",
                format_timestamp(utterance.start_seconds),
                utterance.color,
                escape_html(&utterance.speaker_label),
                escape_html(&utterance.text)
            );
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker::color_for_index;
    use crate::transcript::Utterance;
    use crate::Id;
    use entity::analysis_items::{
        ActionItem, ActionItems, KeyPoint, KeyPoints, Priority, SpeakerNames, Topic, Topics,
    };
    use entity::language::Language;
    use entity::meeting_status::MeetingStatus;

    fn document() -> ExportDocument {
        let now = chrono::Utc::now().fixed_offset();
        let meeting_id = Id::new_v4();
        let speaker_id = Id::new_v4();
        ExportDocument {
            meeting: meetings::Model {
                id: meeting_id,
                user_id: Id::new_v4(),
                project_id: None,
                title: "Q3 <Launch> & Sync".to_string(),
                description: None,
                language: Language::En,
                status: MeetingStatus::Completed,
                duration_seconds: Some(125.0),
                storage_path: "/tmp/a.mp3".to_string(),
                original_filename: "a.mp3".to_string(),
                file_size_bytes: 10,
                processing_error: None,
                ai_instructions: None,
                is_favorite: false,
                processed_at: Some(now),
                created_at: now,
                updated_at: now,
            },
            analysis: Some(analyses::Model {
                id: Id::new_v4(),
                meeting_id,
                summary: "We agreed to ship in July.".to_string(),
                topics: Topics(vec![Topic {
                    title: "Launch".to_string(),
                    description: "Dates".to_string(),
                    importance: 5,
                }]),
                key_points: KeyPoints(vec![KeyPoint {
                    point: "July launch".to_string(),
                    context: None,
                    speaker: Some("Ada".to_string()),
                }]),
                action_items: ActionItems(vec![ActionItem {
                    item: "Draft <press> release".to_string(),
                    assignee: Some("Ada".to_string()),
                    priority: Priority::High,
                }]),
                meeting_document: "# Launch plan".to_string(),
                speaker_names: SpeakerNames::default(),
                raw_response: String::new(),
                created_at: now,
            }),
            transcript: Some(Transcript {
                id: Id::new_v4(),
                meeting_id,
                full_text: "Let's ship in July.".to_string(),
                speakers: vec![],
                utterances: vec![Utterance {
                    id: Id::new_v4(),
                    sequence: 0,
                    text: "Let's ship in July.".to_string(),
                    start_seconds: 65.4,
                    end_seconds: 67.0,
                    confidence: 0.9,
                    speaker_id,
                    speaker_index: 0,
                    speaker_label: "Ada".to_string(),
                    color: color_for_index(0),
                }],
                created_at: now,
            }),
        }
    }

    #[test]
    fn timestamps_are_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.4), "01:05");
        assert_eq!(format_timestamp(3725.0), "1:02:05");
    }

    #[test]
    fn markdown_contains_summary_action_items_and_transcript() {
        let markdown = to_markdown(&document());

        assert!(markdown.starts_with("# Q3 <Launch> & Sync\n"));
        assert!(markdown.contains("## Summary\n\nWe agreed to ship in July."));
        assert!(markdown.contains("- [ ] Draft <press> release @Ada [high]"));
        assert!(markdown.contains("**[01:05] Ada:** Let's ship in July."));
        assert!(markdown.contains("- **Duration:** 02:05"));
    }

    #[test]
    fn html_escapes_user_and_model_text() {
        let html = to_html(&document());

        assert!(html.contains("<title>Q3 &lt;Launch&gt; &amp; Sync</title>"));
        assert!(html.contains("Draft &lt;press&gt; release"));
        assert!(html.contains("Let&#39;s ship in July."));
        assert!(!html.contains("<press>"));
    }

    #[test]
    fn unprocessed_meetings_export_metadata_only() {
        let mut doc = document();
        doc.analysis = None;
        doc.transcript = None;

        let markdown = to_markdown(&doc);

        assert!(!markdown.contains("## Summary"));
        assert!(!markdown.contains("## Transcript"));
    }

    #[test]
    fn filenames_are_slugged_titles() {
        let doc = document();
        assert_eq!(doc.filename(ExportFormat::Markdown), "q3-launch-sync.md");
        assert_eq!(doc.filename(ExportFormat::Html), "q3-launch-sync.html");
    }
}
