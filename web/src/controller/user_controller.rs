use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use domain::user::{self as UserApi, Registration};
use service::config::ApiVersion;

use log::*;

/// CREATE a new User account
#[utoipa::path(
    post,
    path = "/users",
    params(
        ApiVersion,
    ),
    request_body = domain::user::Registration,
    responses(
        (status = 201, description = "Successfully registered a new User", body = [domain::users::Model]),
        (status = 409, description = "Email address already registered"),
        (status = 422, description = "Invalid email address or password too short"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new User for: {}", registration.email);

    let user = UserApi::register(app_state.db_conn_ref(), registration).await?;

    info!("Registered User {}", user.id);

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), user)))
}
