use super::error::Error;
use entity::speakers::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder,
};

pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .order_by_asc(Column::SpeakerIndex)
        .all(db)
        .await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Renames a speaker. A blank label clears it.
pub async fn update_label(
    db: &DatabaseConnection,
    id: Id,
    label: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    let label = label
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty());
    debug!("Renaming speaker {id} to {label:?}");

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        meeting_id: Unchanged(existing.meeting_id),
        speaker_index: Unchanged(existing.speaker_index),
        label: Set(label),
    };

    Ok(active_model.update(db).await?)
}
