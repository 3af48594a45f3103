pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::resumes::handlers as resume_handlers;
use crate::state::AppState;
use crate::template::handlers as template_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Template API
        .route(
            "/api/v1/templates",
            post(template_handlers::handle_create_template),
        )
        .route(
            "/api/v1/templates/validate",
            post(template_handlers::handle_validate),
        )
        .route(
            "/api/v1/templates/:id",
            patch(template_handlers::handle_update_template),
        )
        .route(
            "/api/v1/templates/:id/html",
            get(template_handlers::handle_preview_template),
        )
        // Resume API
        .route(
            "/api/v1/resumes/:id/html",
            get(resume_handlers::handle_resume_html),
        )
        .with_state(state)
}
