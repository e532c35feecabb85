use domain::language::Language;
use domain::meeting_status::MeetingStatus;
use domain::{Id, IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, UpdateMap};
use sea_orm::Value;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    /// Always the authenticated user, never read from the query string
    #[serde(skip)]
    pub(crate) user_id: Id,
    #[param(value_type = Option<Uuid>)]
    pub(crate) project_id: Option<Id>,
    pub(crate) status: Option<MeetingStatus>,
    pub(crate) is_favorite: Option<bool>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "user_id".to_string(),
            Some(Value::Uuid(Some(Box::new(self.user_id)))),
        );
        if let Some(project_id) = self.project_id {
            query_filter_map.insert(
                "project_id".to_string(),
                Some(Value::Uuid(Some(Box::new(project_id)))),
            );
        }
        if let Some(status) = self.status {
            query_filter_map.insert("status".to_string(), Some(status.into()));
        }
        if let Some(is_favorite) = self.is_favorite {
            query_filter_map.insert("is_favorite".to_string(), Some(Value::Bool(Some(is_favorite))));
        }
        query_filter_map
    }
}

/// User editable fields of a meeting. Absent fields are left unchanged; `project_id: null`
/// removes the meeting from its project.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<Language>,
    pub is_favorite: Option<bool>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub project_id: Option<Option<Id>>,
    pub ai_instructions: Option<String>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        if let Some(title) = self.title {
            update_map.insert(
                "title".to_string(),
                Some(Value::String(Some(Box::new(title.trim().to_owned())))),
            );
        }
        if let Some(description) = self.description {
            update_map.insert(
                "description".to_string(),
                Some(Value::String(Some(Box::new(description)))),
            );
        }
        if let Some(language) = self.language {
            update_map.insert("language".to_string(), Some(language.into()));
        }
        if let Some(is_favorite) = self.is_favorite {
            update_map.insert("is_favorite".to_string(), Some(Value::Bool(Some(is_favorite))));
        }
        if let Some(project_id) = self.project_id {
            update_map.insert(
                "project_id".to_string(),
                Some(Value::Uuid(project_id.map(Box::new))),
            );
        }
        if let Some(ai_instructions) = self.ai_instructions {
            let ai_instructions = Some(ai_instructions).filter(|text| !text.trim().is_empty());
            update_map.insert(
                "ai_instructions".to_string(),
                Some(Value::String(ai_instructions.map(Box::new))),
            );
        }
        update_map
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTagsParams {
    #[schema(value_type = Vec<Uuid>)]
    pub tag_ids: Vec<Id>,
}
