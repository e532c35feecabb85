use super::error::Error;
use entity::meeting_tags::{ActiveModel, Column, Entity};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, TransactionTrait};

/// Replaces the full set of tags attached to a meeting.
pub async fn replace_for_meeting(
    db: &impl TransactionTrait,
    meeting_id: Id,
    tag_ids: Vec<Id>,
) -> Result<(), Error> {
    debug!("Replacing tags of meeting {meeting_id} with {tag_ids:?}");

    let txn = db.begin().await?;

    Entity::delete_many()
        .filter(Column::MeetingId.eq(meeting_id))
        .exec(&txn)
        .await?;

    let mut tag_ids = tag_ids;
    tag_ids.sort();
    tag_ids.dedup();

    if !tag_ids.is_empty() {
        Entity::insert_many(tag_ids.into_iter().map(|tag_id| ActiveModel {
            meeting_id: Set(meeting_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(())
}
