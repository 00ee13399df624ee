use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
pub mod rates;
mod system;
mod types;
pub mod users;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn rate_service(&self) -> &Arc<dyn crate::services::RateService> {
        &self.shared.rate_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

#[must_use]
pub fn create_app_state_from_config(config: Config) -> Arc<AppState> {
    create_app_state(Arc::new(SharedState::new(config)))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/otp/request", post(auth::request_otp))
        .route("/auth/otp/verify", post(auth::verify_otp))
        .route("/rates", get(rates::get_rates))
        .route("/rates", put(rates::update_rates))
        .route("/rates/history", get(rates::get_history))
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_admin))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/otp/revoke", post(users::revoke_otp))
        .route("/system/status", get(system::get_status))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
