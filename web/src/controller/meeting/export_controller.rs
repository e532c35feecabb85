use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::export::ExportParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use domain::export::ExportDocument;
use domain::meeting as MeetingApi;
use domain::Id;
use service::config::ApiVersion;

use log::*;

/// GET a Meeting rendered as a downloadable Markdown or HTML document
#[utoipa::path(
    get,
    path = "/meetings/{id}/export",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Meeting to export"),
        ExportParams,
    ),
    responses(
        (status = 200, description = "The rendered document", body = String, content_type = "text/markdown"),
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
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, Error> {
    let format = params.format.unwrap_or_default();
    debug!("GET Export of Meeting {id} as {format:?}");

    let meeting = MeetingApi::find_by_id_for_user(app_state.db_conn_ref(), user.id, id).await?;
    let document = ExportDocument::load(app_state.db_conn_ref(), meeting).await?;

    let content_disposition = format!("attachment; filename=\"{}\"", document.filename(format));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        document.render(format),
    ))
}
