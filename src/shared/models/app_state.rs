use std::sync::Arc;

use crate::{data_access::task_repository::TaskRepository, reporting::error_reporter::ErrorReporter};

pub struct AppState {
    pub tasks: TaskRepository,
    pub reporter: ErrorReporter,
}

pub type SharedState = Arc<AppState>;
