use crate::{
    controller::health_check_controller,
    middleware::{auth::require_auth, rate_limit},
    params, protect, AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::controller::{
    meeting, meeting_controller, project_controller, setting_controller, tag_controller,
    user_controller, user_session_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

/// Room for the multipart framing and text fields around the audio part
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Meeting Notes API"
        ),
        paths(
            health_check_controller::health_check,
            meeting_controller::create,
            meeting_controller::index,
            meeting_controller::read,
            meeting_controller::update,
            meeting_controller::delete,
            meeting_controller::update_tags,
            meeting::processing_controller::create,
            meeting::processing_controller::read,
            meeting::transcript_controller::read,
            meeting::analysis_controller::read,
            meeting::speaker_controller::update,
            meeting::export_controller::read,
            project_controller::create,
            project_controller::index,
            project_controller::update,
            project_controller::delete,
            tag_controller::create,
            tag_controller::index,
            tag_controller::update,
            tag_controller::delete,
            setting_controller::index,
            setting_controller::update,
            setting_controller::delete,
            user_controller::create,
            user_session_controller::login,
            user_session_controller::delete,
        ),
        components(
            schemas(
                domain::analyses::Model,
                domain::credential_key::CredentialKey,
                domain::language::Language,
                domain::meeting_status::MeetingStatus,
                domain::meetings::Model,
                domain::projects::Model,
                domain::tags::Model,
                domain::users::Model,
                domain::meeting::MeetingWithTags,
                domain::meeting::ProcessingStatus,
                domain::setting::CredentialStatus,
                domain::speaker::Speaker,
                domain::transcript::Transcript,
                domain::transcript::Utterance,
                domain::user::Credentials,
                domain::user::Registration,
                params::meeting::UpdateParams,
                params::meeting::UpdateTagsParams,
                params::setting::UpdateParams,
                params::speaker::UpdateParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "meeting_notes", description = "Meeting transcription and analysis API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(meeting_routes(app_state.clone()))
        .merge(meeting_resource_routes(app_state.clone()))
        .merge(project_routes(app_state.clone()))
        .merge(tag_routes(app_state.clone()))
        .merge(setting_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(user_session_routes())
        .merge(user_session_protected_routes(app_state.clone()))
        // **** FIXME: protect the OpenAPI web UI
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn meeting_routes(app_state: AppState) -> Router {
    let body_limit = usize::try_from(app_state.config().max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/meetings",
            post(meeting_controller::create)
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(from_fn_with_state(app_state.clone(), rate_limit::uploads)),
        )
        .route("/meetings", get(meeting_controller::index))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

/// Everything addressed through `/meetings/:id` requires the caller to own the meeting.
fn meeting_resource_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/meetings/:id", get(meeting_controller::read))
        .route("/meetings/:id", put(meeting_controller::update))
        .route("/meetings/:id", delete(meeting_controller::delete))
        .route("/meetings/:id/tags", put(meeting_controller::update_tags))
        .route(
            "/meetings/:id/process",
            post(meeting::processing_controller::create),
        )
        .route(
            "/meetings/:id/status",
            get(meeting::processing_controller::read),
        )
        .route(
            "/meetings/:id/transcript",
            get(meeting::transcript_controller::read),
        )
        .route(
            "/meetings/:id/analysis",
            get(meeting::analysis_controller::read),
        )
        .route(
            "/meetings/:id/speakers/:speaker_id",
            put(meeting::speaker_controller::update),
        )
        .route(
            "/meetings/:id/export",
            get(meeting::export_controller::read),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::meetings::owner,
        ))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn project_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/projects", get(project_controller::index))
        .route("/projects", post(project_controller::create))
        .route("/projects/:id", put(project_controller::update))
        .route("/projects/:id", delete(project_controller::delete))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn tag_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/tags", get(tag_controller::index))
        .route("/tags", post(tag_controller::create))
        .route("/tags/:id", put(tag_controller::update))
        .route("/tags/:id", delete(tag_controller::delete))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn setting_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/settings", get(setting_controller::index))
        .route("/settings/:key", put(setting_controller::update))
        .route("/settings/:key", delete(setting_controller::delete))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(user_controller::create))
        .with_state(app_state)
}

pub fn user_session_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/delete", delete(user_session_controller::delete))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

pub fn user_session_routes() -> Router {
    Router::new().route("/login", post(user_session_controller::login))
}

// This will serve static files that we can use as a "fallback" for when the server panics
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./"))
}
