use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::speaker::UpdateParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::speaker as SpeakerApi;
use domain::Id;
use service::config::ApiVersion;

use log::*;

/// PUT rename a Speaker of a Meeting
#[utoipa::path(
    put,
    path = "/meetings/{id}/speakers/{speaker_id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting"),
        ("speaker_id" = Uuid, Path, description = "Id of the Speaker to rename"),
    ),
    request_body = crate::params::speaker::UpdateParams,
    responses(
        (status = 200, description = "Successfully renamed the Speaker", body = domain::speaker::Speaker),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting or Speaker not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path((id, speaker_id)): Path<(Id, Id)>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Rename Speaker {speaker_id} of Meeting {id}: {params:?}");

    let speaker =
        SpeakerApi::rename(app_state.db_conn_ref(), id, speaker_id, params.into_label()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), speaker)))
}
