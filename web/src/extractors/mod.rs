pub(crate) mod authenticated_user;
pub(crate) mod compare_api_version;
pub(crate) mod meeting_upload;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
