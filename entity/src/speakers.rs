use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::speakers::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "speakers")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[serde(skip_deserializing)]
    pub meeting_id: Id,

    /// Zero-based index in order of first appearance in the transcript
    #[serde(skip_deserializing)]
    pub speaker_index: i32,

    /// Human name, entered by the user or inferred from the conversation
    pub label: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,

    #[sea_orm(has_many = "super::utterances::Entity")]
    Utterances,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::utterances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Utterances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
