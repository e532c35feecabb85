//! Types for transcription results.

use entity::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Continuous speech segment from a single speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Dense zero-based speaker index, see [`SpeakerIndexer`]
    pub speaker_index: i32,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
}

/// A finished transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Utterances in the order the provider returned them
    pub utterances: Vec<Utterance>,
    /// Sorted distinct speaker indices appearing in `utterances`
    pub speakers: Vec<i32>,
    pub duration_seconds: f64,
    pub full_text: String,
    pub language: Language,
    /// Provider response kept verbatim for auditing
    pub raw_response: serde_json::Value,
}

impl Transcription {
    /// Renders the transcript one utterance per line, prefixed with its speaker,
    /// ex. `[Speaker 0]: Good morning everyone.`
    pub fn speaker_prefixed_text(&self) -> String {
        if self.utterances.is_empty() {
            return self.full_text.clone();
        }
        self.utterances
            .iter()
            .map(|u| format!("[Speaker {}]: {}", u.speaker_index, u.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Assigns dense zero-based indices to opaque provider speaker labels in order of
/// first appearance.
///
/// `["A", "B", "A"]` is indexed as `[0, 1, 0]`.
#[derive(Debug, Default)]
pub struct SpeakerIndexer {
    indices: HashMap<String, i32>,
}

impl SpeakerIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_for(&mut self, label: &str) -> i32 {
        let next = self.indices.len() as i32;
        *self.indices.entry(label.to_owned()).or_insert(next)
    }

    /// Every index handed out so far, ascending.
    pub fn speakers(&self) -> Vec<i32> {
        let mut speakers: Vec<i32> = self.indices.values().copied().collect();
        speakers.sort_unstable();
        speakers
    }
}

/// Converts a provider millisecond offset into seconds.
pub fn ms_to_seconds(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speakers_are_indexed_by_first_appearance() {
        let mut indexer = SpeakerIndexer::new();
        let indices: Vec<i32> = ["A", "B", "A"]
            .iter()
            .map(|label| indexer.index_for(label))
            .collect();

        assert_eq!(indices, vec![0, 1, 0]);
        assert_eq!(indexer.speakers(), vec![0, 1]);
    }

    #[test]
    fn labels_are_not_assumed_to_be_ordered() {
        let mut indexer = SpeakerIndexer::new();
        assert_eq!(indexer.index_for("C"), 0);
        assert_eq!(indexer.index_for("A"), 1);
        assert_eq!(indexer.index_for("C"), 0);
    }

    #[test]
    fn ms_to_seconds_keeps_fractions() {
        assert_eq!(ms_to_seconds(1500), 1.5);
        assert_eq!(ms_to_seconds(0), 0.0);
    }

    #[test]
    fn speaker_prefixed_text_renders_one_line_per_utterance() {
        let transcription = Transcription {
            utterances: vec![
                Utterance {
                    speaker_index: 0,
                    text: "Hi, I'm Ada.".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 1.0,
                    confidence: 0.9,
                },
                Utterance {
                    speaker_index: 1,
                    text: "Hello.".to_string(),
                    start_seconds: 1.0,
                    end_seconds: 2.0,
                    confidence: 0.9,
                },
            ],
            speakers: vec![0, 1],
            duration_seconds: 2.0,
            full_text: "Hi, I'm Ada. Hello.".to_string(),
            language: Language::En,
            raw_response: serde_json::Value::Null,
        };

        assert_eq!(
            transcription.speaker_prefixed_text(),
            "[Speaker 0]: Hi, I'm Ada.\n[Speaker 1]: Hello."
        );
    }
}
