use crate::error::Error;
use crate::{speakers, Id};
use entity_api::speaker;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

/// Display colors handed out to speakers in index order.
pub const SPEAKER_PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
];

/// Color of the speaker at `speaker_index`. The palette repeats once exhausted.
pub fn color_for_index(speaker_index: i32) -> &'static str {
    SPEAKER_PALETTE[speaker_index.rem_euclid(SPEAKER_PALETTE.len() as i32) as usize]
}

/// A speaker as shown to users, with its derived display color.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Speaker {
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub meeting_id: Id,
    pub speaker_index: i32,
    pub label: Option<String>,
    #[schema(value_type = String)]
    pub color: &'static str,
}

impl Speaker {
    /// The label, or `Speaker N` when nobody has named the speaker yet.
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("Speaker {}", self.speaker_index))
    }
}

impl From<speakers::Model> for Speaker {
    fn from(model: speakers::Model) -> Self {
        Speaker {
            id: model.id,
            meeting_id: model.meeting_id,
            speaker_index: model.speaker_index,
            color: color_for_index(model.speaker_index),
            label: model.label,
        }
    }
}

pub async fn find_by_meeting_id(db: &DatabaseConnection, meeting_id: Id) -> Result<Vec<Speaker>, Error> {
    Ok(speaker::find_by_meeting_id(db, meeting_id)
        .await?
        .into_iter()
        .map(Speaker::from)
        .collect())
}

/// Renames a speaker of `meeting_id`. A speaker of another meeting reads as not found.
pub async fn rename(
    db: &DatabaseConnection,
    meeting_id: Id,
    speaker_id: Id,
    label: Option<String>,
) -> Result<Speaker, Error> {
    let existing = speaker::find_by_id(db, speaker_id).await?;
    if existing.meeting_id != meeting_id {
        return Err(Error::not_found());
    }
    Ok(speaker::update_label(db, speaker_id, label).await?.into())
}
