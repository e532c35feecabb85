use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::tag as TagApi;
use domain::{tags::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST create a new Tag
#[utoipa::path(
    post,
    path = "/tags",
    params(ApiVersion),
    request_body = domain::tags::Model,
    responses(
        (status = 201, description = "Successfully created a new Tag", body = [domain::tags::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A Tag with this name already exists"),
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
    Json(tag_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Tag from: {tag_model:?}");

    let tag = TagApi::create(app_state.db_conn_ref(), user.id, tag_model).await?;

    debug!("New Tag: {tag:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), tag)))
}

/// GET all Tags of the authenticated user
#[utoipa::path(
    get,
    path = "/tags",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all Tags", body = [domain::tags::Model]),
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
    debug!("GET all Tags");

    let tags = TagApi::find_by_user(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tags)))
}

#[utoipa::path(
    put,
    path = "/tags/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Tag to update"),
    ),
    request_body = domain::tags::Model,
    responses(
        (status = 200, description = "Successfully updated a Tag", body = [domain::tags::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "A Tag with this name already exists"),
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
    Json(tag_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Tag with id: {id}");

    let tag = TagApi::update(app_state.db_conn_ref(), user.id, id, tag_model).await?;

    debug!("Updated Tag: {tag:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tag)))
}

/// DELETE a Tag. It is detached from every Meeting.
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Tag to delete"),
    ),
    responses(
        (status = 204, description = "Successfully deleted a Tag"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tag not found"),
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
    debug!("DELETE Tag by id: {id}");

    TagApi::delete(app_state.db_conn_ref(), user.id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
