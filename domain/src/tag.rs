use crate::error::Error;
use crate::tags::Model;
use crate::Id;
use log::*;
use sea_orm::DatabaseConnection;

/// Creates a tag owned by `user_id`. Names are unique per user.
pub async fn create(db: &DatabaseConnection, user_id: Id, model: Model) -> Result<Model, Error> {
    Ok(entity_api::tag::create(db, user_id, model).await?)
}

pub async fn find_by_user(db: &DatabaseConnection, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(entity_api::tag::find_by_user(db, user_id).await?)
}

/// The tags attached to `meeting_id`, ordered by name.
pub async fn find_by_meeting(db: &DatabaseConnection, meeting_id: Id) -> Result<Vec<Model>, Error> {
    Ok(entity_api::tag::find_by_meeting(db, meeting_id).await?)
}

/// Looks a tag up on behalf of `user_id`. Tags of other users read as not found.
pub async fn find_by_id_for_user(
    db: &DatabaseConnection,
    user_id: Id,
    id: Id,
) -> Result<Model, Error> {
    let tag = entity_api::tag::find_by_id(db, id).await?;
    if tag.user_id != user_id {
        debug!("User {user_id} requested tag {id} owned by another user");
        return Err(Error::not_found());
    }
    Ok(tag)
}

pub async fn update(
    db: &DatabaseConnection,
    user_id: Id,
    id: Id,
    model: Model,
) -> Result<Model, Error> {
    find_by_id_for_user(db, user_id, id).await?;
    Ok(entity_api::tag::update(db, id, model).await?)
}

/// Deletes a tag and detaches it from every meeting.
pub async fn delete(db: &DatabaseConnection, user_id: Id, id: Id) -> Result<(), Error> {
    find_by_id_for_user(db, user_id, id).await?;
    entity_api::tag::delete_by_id(db, id).await?;
    info!("Deleted tag {id}");
    Ok(())
}
