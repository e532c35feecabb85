//! Storage for encrypted third-party credentials. Values arrive here already encrypted;
//! this module never sees plain text keys.

use super::error::Error;
use entity::credential_key::CredentialKey;
use entity::settings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, DatabaseConnection,
};

pub async fn find_by_key(db: &DatabaseConnection, key: CredentialKey) -> Result<Option<Model>, Error> {
    Ok(Entity::find().filter(Column::Key.eq(key)).one(db).await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().all(db).await?)
}

/// Stores `encrypted_value` under `key`, replacing any previous value.
pub async fn upsert(
    db: &DatabaseConnection,
    key: CredentialKey,
    encrypted_value: String,
) -> Result<(), Error> {
    debug!("Storing credential {key}");

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        key: Set(key),
        encrypted_value: Set(encrypted_value),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Entity::insert(active_model)
        .on_conflict(
            OnConflict::column(Column::Key)
                .update_columns([Column::EncryptedValue, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Removes the credential stored under `key`. Returns whether one existed.
pub async fn delete_by_key(db: &DatabaseConnection, key: CredentialKey) -> Result<bool, Error> {
    let result = Entity::delete_many()
        .filter(Column::Key.eq(key))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
