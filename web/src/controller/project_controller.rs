use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::project as ProjectApi;
use domain::{projects::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST create a new Project
#[utoipa::path(
    post,
    path = "/projects",
    params(ApiVersion),
    request_body = domain::projects::Model,
    responses(
        (status = 201, description = "Successfully created a new Project", body = [domain::projects::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A Project with this name already exists"),
        (status = 422, description = "Unprocessable Entity"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(project_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Project from: {project_model:?}");

    let project = ProjectApi::create(app_state.db_conn_ref(), user.id, project_model).await?;

    debug!("New Project: {project:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), project)))
}

/// GET all Projects of the authenticated user
#[utoipa::path(
    get,
    path = "/projects",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all Projects", body = [domain::projects::Model]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Projects");

    let projects = ProjectApi::find_by_user(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), projects)))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Project to update"),
    ),
    request_body = domain::projects::Model,
    responses(
        (status = 200, description = "Successfully updated a Project", body = [domain::projects::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 409, description = "A Project with this name already exists"),
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
    Json(project_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Project with id: {id}");

    let project = ProjectApi::update(app_state.db_conn_ref(), user.id, id, project_model).await?;

    debug!("Updated Project: {project:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), project)))
}

/// DELETE a Project. Its Meetings are kept and become unassigned.
#[utoipa::path(
    delete,
    path = "/projects/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Project to delete"),
    ),
    responses(
        (status = 204, description = "Successfully deleted a Project"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
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
    debug!("DELETE Project by id: {id}");

    ProjectApi::delete(app_state.db_conn_ref(), user.id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
