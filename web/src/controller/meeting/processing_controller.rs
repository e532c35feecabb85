use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::meeting::{self as MeetingApi, ProcessingStatus};
use domain::processing as ProcessingApi;
use domain::Id;
use service::config::ApiVersion;

use log::*;

/// POST start transcription and analysis of a Meeting
///
/// Returns as soon as the Meeting is claimed; poll `GET /meetings/{id}/status` for
/// progress.
#[utoipa::path(
    post,
    path = "/meetings/{id}/process",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting to process"),
    ),
    responses(
        (status = 202, description = "Processing started", body = domain::meeting::ProcessingStatus),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting not found"),
        (status = 409, description = "Meeting already processed or being processed"),
        (status = 429, description = "Too many processing requests"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Process Meeting {id}");

    app_state.processing_limiter.check(&user.id.to_string())?;

    ProcessingApi::start_processing(app_state.db_conn(), app_state.config(), user.id, id).await?;

    let meeting = MeetingApi::find_by_id(app_state.db_conn_ref(), id).await?;

    info!("Processing of Meeting {id} started");

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            StatusCode::ACCEPTED.into(),
            ProcessingStatus::from(&meeting),
        )),
    ))
}

/// GET the processing status of a Meeting
#[utoipa::path(
    get,
    path = "/meetings/{id}/status",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting"),
    ),
    responses(
        (status = 200, description = "Current processing status", body = domain::meeting::ProcessingStatus),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    trace!("GET Processing status of Meeting {id}");

    let meeting = MeetingApi::find_by_id_for_user(app_state.db_conn_ref(), user.id, id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        ProcessingStatus::from(&meeting),
    )))
}
