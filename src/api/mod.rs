pub mod routes;
pub mod models;
pub mod errors;
pub mod auth;

use std::sync::Arc;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::auth::{AccessPolicy, AuthBackend, LocalAuthBackend};
use crate::config::credentials::{mask_email, resolve_credential};
use crate::config::CiphertraceConfig;
use crate::db::Database;
use crate::errors::CiphertraceError;
use crate::session::SessionStore;
use crate::tools::ToolRegistry;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub auth: Arc<dyn AuthBackend>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(registry: ToolRegistry, auth: Arc<dyn AuthBackend>, policy: AccessPolicy) -> Self {
        Self {
            registry: Arc::new(registry),
            auth,
            policy: Arc::new(policy),
        }
    }
}

pub async fn create_app_state(config: &CiphertraceConfig, db_path: &str) -> Result<AppState, CiphertraceError> {
    let db = Database::new(db_path)?;
    let registry = ToolRegistry::from_config(config, SessionStore::new(db));

    let auth = LocalAuthBackend::new(config.auth.token_ttl_minutes);
    if let Some(admin) = &config.auth.bootstrap_admin {
        let password = resolve_credential(&admin.password);
        auth.provision(&admin.email, &password, &admin.full_name, admin.role)?;
        info!(email = %mask_email(&admin.email), role = %admin.role, "Bootstrap account ready");
    }

    Ok(AppState::new(registry, Arc::new(auth), config.access_policy()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/auth/sign-in", post(routes::auth::sign_in))
        .route("/api/auth/sign-up", post(routes::auth::sign_up))
        .route("/api/auth/sign-out", post(routes::auth::sign_out))
        .route("/api/auth/reset-password", post(routes::auth::reset_password))
        .route("/api/auth/session", get(routes::auth::current_session))
        .route("/api/tools", get(routes::tools::list_tools))
        .route("/api/tools/:tool/scans", post(routes::tools::run_scan))
        .route(
            "/api/tools/:tool/session",
            get(routes::tools::get_current).delete(routes::tools::reset_current),
        )
        .route("/api/tools/:tool/history", get(routes::tools::list_history))
        .route("/api/tools/:tool/history/:id", get(routes::tools::get_session))
        .route("/api/tools/:tool/export", get(routes::tools::export))
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/case-history", get(routes::pages::case_history))
        .route("/report-center", get(routes::pages::report_center))
        .layer(middleware::from_fn_with_state(state.clone(), auth::access_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
