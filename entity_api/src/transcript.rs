//! Read access to transcripts and their ordered utterances.

use super::error::Error;
use entity::transcripts::{Column, Entity, Model};
use entity::{utterances, Id};
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder};

pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .one(db)
        .await?)
}

/// Utterances of a transcript in the order the provider returned them.
pub async fn find_utterances(
    db: &DatabaseConnection,
    transcript_id: Id,
) -> Result<Vec<utterances::Model>, Error> {
    Ok(utterances::Entity::find()
        .filter(utterances::Column::TranscriptId.eq(transcript_id))
        .order_by_asc(utterances::Column::Sequence)
        .all(db)
        .await?)
}
