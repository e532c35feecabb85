use uuid::Uuid;

// Accounts
pub mod users;

// Meetings and their processing results
pub mod analyses;
pub mod analysis_items;
pub mod language;
pub mod meeting_status;
pub mod meetings;
pub mod speakers;
pub mod transcripts;
pub mod utterances;

// Grouping of meetings
pub mod meeting_tags;
pub mod projects;
pub mod tags;

// Third-party credentials
pub mod credential_key;
pub mod settings;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
