pub mod health_routes;
pub mod task_routes;

use std::path::Path;

use axum::{middleware, Router};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    app_state::SharedState,
    reporting::error_reporter::report_failures,
    web_api::error::{fallback, handle_panic},
};

/// The whole application: pages, health check, static files and the
/// cross-cutting layers (panic recovery, failure reporting, request tracing).
pub fn map_routes(app_state: SharedState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .merge(task_routes::get_router(app_state.clone()))
        .merge(health_routes::get_router(app_state.clone()))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(fallback)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(app_state.reporter.clone(), report_failures))
        .layer(TraceLayer::new_for_http())
}
