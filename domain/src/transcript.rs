//! Read model of a finished transcript: utterances joined with their speakers.

use crate::error::Error;
use crate::speaker::{self, Speaker};
use crate::{utterances, Id};
use chrono::{DateTime, FixedOffset};
use entity_api::transcript;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Utterance {
    #[schema(value_type = Uuid)]
    pub id: Id,
    pub sequence: i32,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
    #[schema(value_type = Uuid)]
    pub speaker_id: Id,
    pub speaker_index: i32,
    pub speaker_label: String,
    #[schema(value_type = String)]
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Transcript {
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub meeting_id: Id,
    pub full_text: String,
    pub speakers: Vec<Speaker>,
    pub utterances: Vec<Utterance>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<FixedOffset>,
}

/// Loads the transcript of a meeting. A meeting that was never processed has none.
pub async fn find_by_meeting_id(db: &DatabaseConnection, meeting_id: Id) -> Result<Transcript, Error> {
    let transcript = transcript::find_by_meeting_id(db, meeting_id)
        .await?
        .ok_or_else(Error::not_found)?;
    let speakers = speaker::find_by_meeting_id(db, meeting_id).await?;
    let utterances = transcript::find_utterances(db, transcript.id).await?;

    Ok(Transcript {
        id: transcript.id,
        meeting_id,
        full_text: transcript.full_text,
        utterances: attribute_utterances(utterances, &speakers),
        speakers,
        created_at: transcript.created_at,
    })
}

/// Attaches speaker labels and colors to stored utterances.
pub fn attribute_utterances(
    utterances: Vec<utterances::Model>,
    speakers: &[Speaker],
) -> Vec<Utterance> {
    let by_id: HashMap<Id, &Speaker> = speakers.iter().map(|s| (s.id, s)).collect();

    utterances
        .into_iter()
        .map(|utterance| {
            let (speaker_index, speaker_label, color) = match by_id.get(&utterance.speaker_id) {
                Some(speaker) => (speaker.speaker_index, speaker.display_name(), speaker.color),
                None => (0, "Unknown speaker".to_string(), speaker::color_for_index(0)),
            };
            Utterance {
                id: utterance.id,
                sequence: utterance.sequence,
                text: utterance.text,
                start_seconds: utterance.start_seconds,
                end_seconds: utterance.end_seconds,
                confidence: utterance.confidence,
                speaker_id: utterance.speaker_id,
                speaker_index,
                speaker_label,
                color,
            }
        })
        .collect()
}
