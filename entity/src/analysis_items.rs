//! Structured analysis values stored as JSON columns on the analyses table.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lowest and highest importance a topic may carry.
pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Topic {
    pub title: String,
    pub description: String,
    /// 1 (minor) to 5 (central to the meeting)
    pub importance: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyPoint {
    pub point: String,
    pub context: Option<String>,
    /// Name or label of the speaker the point is attributed to
    pub speaker: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parses a model supplied priority; anything unrecognized is treated as medium.
    pub fn from_loose(value: Option<&str>) -> Priority {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("high") => Priority::High,
            Some("low") => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(fmt, "high"),
            Priority::Medium => write!(fmt, "medium"),
            Priority::Low => write!(fmt, "low"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionItem {
    pub item: String,
    pub assignee: Option<String>,
    pub priority: Priority,
}

/// A name the analysis model attributed to a diarized speaker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SpeakerName {
    pub speaker_index: i32,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct Topics(pub Vec<Topic>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct KeyPoints(pub Vec<KeyPoint>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct ActionItems(pub Vec<ActionItem>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct SpeakerNames(pub Vec<SpeakerName>);

impl SpeakerNames {
    /// Name inferred for the speaker at `speaker_index`, if any.
    pub fn name_for(&self, speaker_index: i32) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.speaker_index == speaker_index)
            .map(|entry| entry.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_from_loose_defaults_to_medium() {
        assert_eq!(Priority::from_loose(Some("HIGH")), Priority::High);
        assert_eq!(Priority::from_loose(Some(" low ")), Priority::Low);
        assert_eq!(Priority::from_loose(Some("urgent")), Priority::Medium);
        assert_eq!(Priority::from_loose(None), Priority::Medium);
    }

    #[test]
    fn name_for_finds_the_matching_speaker() {
        let names = SpeakerNames(vec![
            SpeakerName {
                speaker_index: 0,
                name: "Alice".to_string(),
            },
            SpeakerName {
                speaker_index: 2,
                name: "Carol".to_string(),
            },
        ]);
        assert_eq!(names.name_for(2), Some("Carol"));
        assert_eq!(names.name_for(1), None);
    }
}
