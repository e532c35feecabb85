use crate::analyses::Model;
use crate::error::Error;
use crate::Id;
use sea_orm::DatabaseConnection;

/// The analysis of a meeting. A meeting that never completed processing has none.
pub async fn find_by_meeting_id(db: &DatabaseConnection, meeting_id: Id) -> Result<Model, Error> {
    entity_api::analysis::find_by_meeting_id(db, meeting_id)
        .await?
        .ok_or_else(Error::not_found)
}
