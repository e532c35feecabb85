//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with query filters within the domain layer, while encapsulating
//! the underlying implementation details remain in the `entity_api` crate.
pub use entity_api::{IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, UpdateMap};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    analyses, analysis_items, credential_key, language, meeting_status, meeting_tags, meetings,
    projects, settings, speakers, tags, transcripts, users, utterances, Id,
};

pub mod analysis;
pub mod encryption;
pub mod error;
pub mod export;
pub mod meeting;
pub mod processing;
pub mod project;
pub mod rate_limit;
pub mod setting;
pub mod speaker;
pub mod tag;
pub mod transcript;
pub mod upload;
pub mod user;

pub mod gateway;
