use axum::{routing::get, Router};

use crate::{app_state::SharedState, task_controller::TaskController};

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route("/", get(TaskController::home))
        .route("/read", get(TaskController::read))
        .route("/create", get(TaskController::create_form).post(TaskController::create))
        .route("/top/:id", get(TaskController::top))
        .route("/edit/:id", get(TaskController::edit_form).post(TaskController::edit))
        .route("/delete/:id", get(TaskController::delete))
        .with_state(app_state)
}
