// Requests
pub mod task_form;
