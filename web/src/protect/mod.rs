//! This module provides protection mechanisms for various resources in the web application.
//!
//! It includes submodules for authorizing access to resources. Each submodule contains the necessary logic to protect
//! the corresponding resources, ensuring that only authorized users can access or modify them.

pub(crate) mod meetings;

use crate::AppState;
use async_trait::async_trait;
use axum::{extract::Request, http::StatusCode, middleware::Next, response::IntoResponse};
use domain::{meeting as MeetingApi, Id};
use log::*;

/// Trait representing a single authorization rule.
///
/// Implementors answer **“is the authenticated user allowed to proceed?”**.
/// The rule receives:
/// * shared application state (`AppState`)
/// * the authenticated [`domain::users::Model`]
/// * any additional [`Id`] parameters supplied by the caller.
#[async_trait]
pub trait Check: Send + Sync {
    async fn eval(&self, app: &AppState, user: &domain::users::Model, args: Vec<Id>) -> Access;
}

/// Outcome of a [`Check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    /// The resource the check is about does not exist
    Missing,
}

/// Pairs a [`Check`] implementation with the concrete arguments that the rule
/// should receive when evaluated.
pub(crate) struct Predicate {
    predicate: Box<dyn Check>,
    args: Vec<Id>,
}

impl Predicate {
    pub(crate) fn new<C: Check + 'static>(predicate: C, args: Vec<Id>) -> Self {
        Self {
            predicate: Box::new(predicate),
            args,
        }
    }

    pub(crate) async fn check(&self, app_state: &AppState, user: &domain::users::Model) -> Access {
        self.predicate
            .eval(app_state, user, self.args.clone())
            .await
    }
}

/// Axum middleware that enforces one or more [`Predicate`]s.
///
/// Each predicate is evaluated in the order supplied. The first denial aborts the
/// request with **403 FORBIDDEN**, a missing resource with **404 NOT FOUND**. When all
/// rules pass the wrapped handler (`next`) is executed.
pub(crate) async fn authorize(
    app_state: &AppState,
    authenticated_user: domain::users::Model,
    request: Request,
    next: Next,
    checks: Vec<Predicate>,
) -> impl IntoResponse {
    for check in checks {
        match check.check(app_state, &authenticated_user).await {
            Access::Granted => {}
            Access::Denied => return (StatusCode::FORBIDDEN, "FORBIDDEN").into_response(),
            Access::Missing => return (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
        }
    }
    next.run(request).await
}

/// Grants access to the owner of the meeting passed as the first argument.
pub struct UserOwnsMeeting;

#[async_trait]
impl Check for UserOwnsMeeting {
    async fn eval(
        &self,
        app_state: &AppState,
        authenticated_user: &domain::users::Model,
        args: Vec<Id>,
    ) -> Access {
        let Some(meeting_id) = args.first().copied() else {
            return Access::Denied;
        };
        match MeetingApi::find_by_id(app_state.db_conn_ref(), meeting_id).await {
            Ok(meeting) if meeting.user_id == authenticated_user.id => Access::Granted,
            Ok(_) => {
                warn!(
                    "User {} denied access to meeting {meeting_id}",
                    authenticated_user.id
                );
                Access::Denied
            }
            Err(e) => {
                debug!("Meeting {meeting_id} not found: {e:?}");
                Access::Missing
            }
        }
    }
}
