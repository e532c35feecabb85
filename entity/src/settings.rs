//! SeaORM Entity for settings table.
//! Stores third-party API credentials, encrypted at rest.

use crate::credential_key::CredentialKey;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "meeting_notes", table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    pub key: CredentialKey,

    /// Base64 of nonce || AES-256-GCM ciphertext
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub encrypted_value: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
