use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
    HeaderName, HeaderValue, Method,
};
use axum_login::{
    tower_sessions::{Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use domain::rate_limit::{FixedWindowRateLimiter, RateLimiter};
use domain::user::Backend;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::{ApiVersion, Config};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use time::Duration as SessionDuration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_sessions_sqlx_store::PostgresStore;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod protect;
mod router;

pub use self::error::{Error, Result};

/// Request handler state: the shared service state plus the admission limiters.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub processing_limiter: Arc<dyn RateLimiter>,
    pub upload_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Wraps `service_state` with in-memory fixed-window limiters sized from its config.
    pub fn new(service_state: service::AppState) -> Self {
        let config = &service_state.config;
        let processing_limiter = Arc::new(FixedWindowRateLimiter::new(
            config.processing_rate_limit,
            Duration::from_secs(config.processing_rate_window_secs),
        ));
        let upload_limiter = Arc::new(FixedWindowRateLimiter::new(
            config.upload_rate_limit,
            Duration::from_secs(config.upload_rate_window_secs),
        ));

        Self {
            service_state,
            processing_limiter,
            upload_limiter,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn db_conn(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.service_state.database_connection)
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> io::Result<()> {
    let config = app_state.config().clone();

    // Sessions live next to the application tables
    let session_store = PostgresStore::new(
        app_state
            .db_conn_ref()
            .get_postgres_connection_pool()
            .to_owned(),
    )
    .with_schema_name(service::DB_SCHEMA)
    .map_err(io::Error::other)?
    .with_table_name("authorized_sessions")
    .map_err(io::Error::other)?;

    session_store.migrate().await.map_err(io::Error::other)?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.is_production())
        .with_expiry(Expiry::OnInactivity(SessionDuration::seconds(
            config.backend_session_expiry_seconds as i64,
        )));

    let backend = Backend::new(&app_state.service_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{interface}:{}", config.port);
    let listener = TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::DELETE, Method::GET, Method::POST, Method::PUT])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(ApiVersion::field_name()),
        ])
        .expose_headers([RETRY_AFTER])
        .allow_origin(allowed_origins);

    axum::serve(
        listener,
        router::define_routes(app_state)
            .layer(cors_layer)
            .layer(auth_layer)
            .into_make_service(),
    )
    .await
}
