use crate::protect::{authorize, Predicate, UserOwnsMeeting};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::IntoResponse,
};
use domain::Id;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct MeetingPath {
    id: Id,
}

/// Checks that the meeting referenced by the `:id` path segment exists and belongs to
/// the authenticated user. Other path segments, ex. `:speaker_id`, are ignored.
///  Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn owner(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(path): Path<MeetingPath>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserOwnsMeeting, vec![path.id])];
    authorize(&app_state, user, request, next, checks).await
}
