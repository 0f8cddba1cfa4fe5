// routes.rs
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/polls", get(handlers::list_polls).post(handlers::create_poll))
        .route("/polls/{id}", get(handlers::get_poll).delete(handlers::delete_poll))
        .route("/polls/{id}/vote", post(handlers::vote))
        .route("/polls/{id}/results", get(handlers::get_results))
}

/// Full application router: API, health check, optional static files.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let cors = if config.cors_permissive {
        warn!("CORS: permissive mode enabled, all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes());

    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
