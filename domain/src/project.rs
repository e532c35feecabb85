use crate::error::Error;
use crate::projects::Model;
use crate::Id;
use log::*;
use sea_orm::DatabaseConnection;

/// Creates a project owned by `user_id`. Names are unique per user.
pub async fn create(db: &DatabaseConnection, user_id: Id, model: Model) -> Result<Model, Error> {
    Ok(entity_api::project::create(db, user_id, model).await?)
}

pub async fn find_by_user(db: &DatabaseConnection, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(entity_api::project::find_by_user(db, user_id).await?)
}

/// Looks a project up on behalf of `user_id`. Projects of other users read as not found.
pub async fn find_by_id_for_user(
    db: &DatabaseConnection,
    user_id: Id,
    id: Id,
) -> Result<Model, Error> {
    let project = entity_api::project::find_by_id(db, id).await?;
    if project.user_id != user_id {
        debug!("User {user_id} requested project {id} owned by another user");
        return Err(Error::not_found());
    }
    Ok(project)
}

pub async fn update(
    db: &DatabaseConnection,
    user_id: Id,
    id: Id,
    model: Model,
) -> Result<Model, Error> {
    find_by_id_for_user(db, user_id, id).await?;
    Ok(entity_api::project::update(db, id, model).await?)
}

/// Deletes a project. Its meetings are kept and become unassigned.
pub async fn delete(db: &DatabaseConnection, user_id: Id, id: Id) -> Result<(), Error> {
    find_by_id_for_user(db, user_id, id).await?;
    entity_api::project::delete_by_id(db, id).await?;
    info!("Deleted project {id}");
    Ok(())
}
