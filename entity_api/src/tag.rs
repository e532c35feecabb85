use super::error::Error;
use entity::tags::{ActiveModel, Column, Entity, Model};
use entity::{meeting_tags, Id};
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, JoinType, QueryOrder, QuerySelect,
};

pub async fn create(db: &DatabaseConnection, user_id: Id, tag_model: Model) -> Result<Model, Error> {
    debug!("New tag to be inserted for user {user_id}: {}", tag_model.name);

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(user_id),
        name: Set(tag_model.name.trim().to_owned()),
        color: Set(tag_model.color),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        user_id: Unchanged(existing.user_id),
        name: Set(model.name.trim().to_owned()),
        color: Set(model.color),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn find_by_user(db: &DatabaseConnection, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

/// Tags attached to a meeting, by name.
pub async fn find_by_meeting(db: &DatabaseConnection, meeting_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .join(JoinType::InnerJoin, entity::tags::Relation::MeetingTags.def())
        .filter(meeting_tags::Column::MeetingId.eq(meeting_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

/// Deletes a tag. Association rows go with it; the meetings stay.
pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found());
    }
    Ok(())
}
