use crate::{extractors::authenticated_user::AuthenticatedUser, AppState, Error};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use log::*;

/// Counts an upload against the user's upload limit before the multipart body is read,
/// so a rejected client never gets its recording buffered.
///  Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn uploads(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    if let Err(rate_limited) = app_state.upload_limiter.check(&user.id.to_string()) {
        info!("Rejecting upload from user {}: {rate_limited}", user.id);
        return Err(rate_limited.into());
    }

    Ok(next.run(request).await)
}
