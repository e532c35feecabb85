use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
    meeting_upload::MeetingUpload,
};
use crate::params::meeting::{IndexParams, UpdateParams, UpdateTagsParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::meeting as MeetingApi;
use domain::Id;
use service::config::ApiVersion;

use log::*;

/// POST upload a recording and create a new Meeting from it
///
/// Expects `multipart/form-data` with a `file` part and optional `title`, `description`,
/// `language`, `project_id` and `ai_instructions` fields.
#[utoipa::path(
    post,
    path = "/meetings",
    params(ApiVersion),
    request_body(content = String, description = "Audio file plus meeting metadata", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Successfully created a new Meeting", body = [domain::meetings::Model]),
        (status = 400, description = "Missing or empty file"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Unsupported audio format"),
        (status = 429, description = "Too many uploads"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    upload: MeetingUpload,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST Create a new Meeting from upload {:?} ({} bytes)",
        upload.audio.filename,
        upload.audio.bytes.len()
    );

    let meeting = MeetingApi::create(
        app_state.db_conn_ref(),
        app_state.config(),
        user.id,
        upload.new_meeting,
        upload.audio,
    )
    .await?;

    debug!("New Meeting: {meeting:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), meeting)))
}

/// GET all Meetings of the authenticated user, newest first
#[utoipa::path(
    get,
    path = "/meetings",
    params(
        ApiVersion,
        IndexParams,
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Meetings", body = [domain::meetings::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Meetings");
    let params = IndexParams {
        user_id: user.id,
        ..params
    };
    info!("Params: {params:?}");

    let meetings = MeetingApi::find_by(app_state.db_conn_ref(), params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), meetings)))
}

/// GET a particular Meeting, with its tags, specified by its id.
#[utoipa::path(
    get,
    path = "/meetings/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Meeting id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Meeting", body = domain::meeting::MeetingWithTags),
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
    debug!("GET Meeting by id: {id}");

    let meeting = MeetingApi::find_by_id_for_user(app_state.db_conn_ref(), user.id, id).await?;
    let meeting = MeetingApi::find_with_tags(app_state.db_conn_ref(), meeting).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), meeting)))
}

#[utoipa::path(
    put,
    path = "/meetings/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting to update"),
    ),
    request_body = crate::params::meeting::UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a Meeting", body = [domain::meetings::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting or Project not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Meeting {id} with: {params:?}");

    let meeting = MeetingApi::update(app_state.db_conn_ref(), user.id, id, params).await?;

    debug!("Updated Meeting: {meeting:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), meeting)))
}

/// DELETE a Meeting together with its transcript, analysis and audio file.
#[utoipa::path(
    delete,
    path = "/meetings/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting to delete"),
    ),
    responses(
        (status = 204, description = "Successfully deleted a Meeting"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Meeting by id: {id}");

    let meeting = MeetingApi::find_by_id_for_user(app_state.db_conn_ref(), user.id, id).await?;
    MeetingApi::delete(app_state.db_conn_ref(), meeting).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

/// PUT replace the tags attached to a Meeting
#[utoipa::path(
    put,
    path = "/meetings/{id}/tags",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting to tag"),
    ),
    request_body = crate::params::meeting::UpdateTagsParams,
    responses(
        (status = 200, description = "Successfully replaced the tags of a Meeting", body = [domain::tags::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting not found"),
        (status = 422, description = "A tag does not belong to the user"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_tags(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateTagsParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Tags of Meeting {id}: {:?}", params.tag_ids);

    let tags = MeetingApi::set_tags(app_state.db_conn_ref(), user.id, id, params.tag_ids).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tags)))
}
