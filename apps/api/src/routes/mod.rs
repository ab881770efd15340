pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::require_password;
use crate::generation::handlers as generation;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/template", get(jobs::handle_example_template))
        .route("/sessions", post(jobs::handle_create_session))
        .route(
            "/sessions/:id",
            get(jobs::handle_get_session).delete(jobs::handle_delete_session),
        )
        .route("/sessions/:id/jobs", post(jobs::handle_append_job))
        .route(
            "/sessions/:id/upload",
            post(jobs::handle_upload).delete(jobs::handle_discard_upload),
        )
        .route("/sessions/:id/generate", post(generation::handle_generate))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_password,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .with_state(state)
}
