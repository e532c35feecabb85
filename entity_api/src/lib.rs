use chrono::Utc;
use password_auth::generate_hash;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, Value};
use std::collections::HashMap;

pub use entity::{
    analyses, analysis_items, credential_key, language, meeting_status, meeting_tags, meetings,
    projects, settings, speakers, tags, transcripts, users, utterances, Id,
};

pub mod analysis;
pub mod error;
pub mod meeting;
pub mod meeting_tag;
pub mod mutate;
pub mod project;
pub mod query;
pub mod setting;
pub mod speaker;
pub mod tag;
pub mod transcript;
pub mod user;

pub use mutate::{IntoUpdateMap, UpdateMap};

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are column names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("is_favorite".to_string(), Some(Value::Bool(Some(true))));
/// let filter_value = query_filter_map.get("is_favorite");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// `IntoQueryFilterMap` is a trait that provides a method for converting a struct into a `QueryFilterMap`.
/// Implementing it lets web query parameters flow down to `query::find_by` without the
/// web layer knowing anything about SeaORM's query builder.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// Seeds a development database with a demo account, a project and a few tags.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();

    let demo_user = users::ActiveModel {
        id: Set(Id::new_v4()),
        email: Set("demo@meetingnotes.local".to_owned()),
        display_name: Set(Some("Demo User".to_owned())),
        password: Set(generate_hash("password")),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    for (name, color, icon) in [
        ("Engineering", "#3B82F6", Some("code")),
        ("Customer Calls", "#10B981", Some("phone")),
    ] {
        projects::ActiveModel {
            id: Set(Id::new_v4()),
            user_id: Set(demo_user.id),
            name: Set(name.to_owned()),
            color: Set(color.to_owned()),
            icon: Set(icon.map(str::to_owned)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
    }

    for (name, color) in [("standup", "#F59E0B"), ("planning", "#8B5CF6")] {
        tags::ActiveModel {
            id: Set(Id::new_v4()),
            user_id: Set(demo_user.id),
            name: Set(name.to_owned()),
            color: Set(color.to_owned()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_filter_map_flattens_missing_values() {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert("project_id".to_string(), None);
        query_filter_map.insert("is_favorite".to_string(), Some(Value::Bool(Some(true))));

        assert!(query_filter_map.get("project_id").is_none());
        assert!(query_filter_map.get("status").is_none());
        assert_eq!(
            query_filter_map.get("is_favorite"),
            Some(Value::Bool(Some(true)))
        );
    }
}
