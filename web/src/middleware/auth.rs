use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_login::AuthSession;
use log::*;

/// Rejects requests without a logged in session with 401 Unauthorized.
///
/// Used instead of axum-login's `login_required!`, which redirects to a login page.
pub async fn require_auth(
    auth_session: AuthSession<domain::user::Backend>,
    request: Request,
    next: Next,
) -> Response {
    if auth_session.user.is_some() {
        return next.run(request).await;
    }

    debug!(
        "Rejecting unauthenticated {} {}",
        request.method(),
        request.uri().path()
    );
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn,
        routing::{get, post},
        Router,
    };
    use axum_login::{
        tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use chrono::Utc;
    use domain::user::Backend;
    use domain::{users, Id};
    use password_auth::generate_hash;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use time::Duration;
    use tower::ServiceExt;

    async fn meetings_handler() -> &'static str {
        "meetings"
    }

    /// `/login` plus a `/meetings` route guarded by `require_auth`.
    fn app(db: DatabaseConnection) -> Router {
        let db = Arc::new(db);
        let app_state = crate::AppState::new(service::AppState::new(Config::from_env(), &db));

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::days(1)))
            .with_always_save(true);
        let auth_layer = AuthManagerLayerBuilder::new(Backend::new(&db), session_layer).build();

        Router::new()
            .route(
                "/login",
                post(crate::controller::user_session_controller::login),
            )
            .merge(
                Router::new()
                    .route("/meetings", get(meetings_handler))
                    .route_layer(from_fn(require_auth)),
            )
            .layer(auth_layer)
            .with_state(app_state)
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[tokio::test]
    async fn rejects_requests_without_a_session() {
        let request = Request::builder()
            .uri("/meetings")
            .body(Body::empty())
            .unwrap();

        let response = app(empty_db()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_unknown_session_cookies() {
        let request = Request::builder()
            .uri("/meetings")
            .header("cookie", "id=invalid-session-id")
            .body(Body::empty())
            .unwrap();

        let response = app(empty_db()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lets_logged_in_users_through() {
        let user = users::Model {
            id: Id::new_v4(),
            email: "ada@example.com".to_string(),
            display_name: Some("Ada".to_string()),
            password: generate_hash("correct horse"),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]]) // find_by_email while authenticating
            .append_query_results([[user.clone()]]) // get_user when the session is loaded
            .append_query_results([[user.clone()]])
            .into_connection();
        let app = app(db);

        let login_request = Request::builder()
            .uri("/login")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("email=ada@example.com&password=correct+horse"))
            .unwrap();
        let login_response = app.clone().oneshot(login_request).await.unwrap();
        assert_eq!(login_response.status(), StatusCode::OK);

        let cookie = login_response
            .headers()
            .get("set-cookie")
            .and_then(|c| c.to_str().ok())
            .expect("Login should return session cookie")
            .to_owned();

        let request = Request::builder()
            .uri("/meetings")
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
