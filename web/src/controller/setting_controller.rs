use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::setting::UpdateParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::credential_key::CredentialKey;
use domain::setting as SettingApi;
use service::config::ApiVersion;

use log::*;

/// GET the configuration state of every provider credential. Values are masked.
#[utoipa::path(
    get,
    path = "/settings",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the credential status", body = [domain::setting::CredentialStatus]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Settings");

    let settings = SettingApi::find_all_status(app_state.db_conn_ref(), app_state.config()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), settings)))
}

/// PUT store a provider API key, encrypted at rest
#[utoipa::path(
    put,
    path = "/settings/{key}",
    params(
        ApiVersion,
        ("key" = CredentialKey, Path, description = "Which provider credential to store"),
    ),
    request_body = crate::params::setting::UpdateParams,
    responses(
        (status = 204, description = "Successfully stored the credential"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Empty value"),
        (status = 500, description = "No encryption key configured on the server"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(key): Path<CredentialKey>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    // Never log the value itself
    info!("PUT Setting {key} by user {}", user.id);

    SettingApi::set_api_key(
        app_state.db_conn_ref(),
        app_state.config(),
        key,
        &params.value,
    )
    .await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

/// DELETE a stored provider API key
#[utoipa::path(
    delete,
    path = "/settings/{key}",
    params(
        ApiVersion,
        ("key" = CredentialKey, Path, description = "Which provider credential to remove"),
    ),
    responses(
        (status = 204, description = "Successfully removed the credential"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(key): Path<CredentialKey>,
) -> Result<impl IntoResponse, Error> {
    info!("DELETE Setting {key} by user {}", user.id);

    SettingApi::delete_api_key(app_state.db_conn_ref(), key).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
