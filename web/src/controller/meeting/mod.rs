//! Endpoints nested under `/meetings/:id` that expose processing and its results.
//! All of them run behind the meeting ownership check.

pub(crate) mod analysis_controller;
pub(crate) mod export_controller;
pub(crate) mod processing_controller;
pub(crate) mod speaker_controller;
pub(crate) mod transcript_controller;
