use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::analysis as AnalysisApi;
use domain::Id;
use service::config::ApiVersion;

use log::*;

/// GET the AI analysis of a processed Meeting
#[utoipa::path(
    get,
    path = "/meetings/{id}/analysis",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the analysis", body = domain::analyses::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meeting not found or not analyzed yet"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Analysis of Meeting {id}");

    let analysis = AnalysisApi::find_by_meeting_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), analysis)))
}
