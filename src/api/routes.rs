use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    boom, check_user, create_user, explode, get_user, health, search_users, AppState,
};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::advice;
use crate::config::AdviceConfig;

pub fn create_router(state: AppState, advice_config: &AdviceConfig) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health))
        // User endpoints
        .route("/users", post(create_user))
        .route("/users/search", get(search_users))
        .route("/users/check", post(check_user))
        .route("/users/:id", get(get_user))
        // Failure demos
        .route("/boom", get(boom))
        .route("/panic", get(explode))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    // Order matters: logging must wrap the advice so the request id is visible to it
    advice::install(router, advice_config)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
