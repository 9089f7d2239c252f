pub mod health;
pub mod jobs;
pub mod search;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/search", post(search::handle_search))
        .route("/api/v1/search/cv", post(search::handle_cv_search))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .with_state(state)
}
