use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use tera::Context;
use uuid::Uuid;

use crate::{
    app_state::SharedState,
    data_access::task_repository::{TaskError, IMPORTANT_PRIORITY, LIST_ORDER},
    task_form::TaskForm,
    web_api::{
        error::{not_found_page, AppError},
        views,
    },
};

pub const LIST_PATH: &str = "/read";

pub struct TaskController {}

impl TaskController {
    // GET /
    pub async fn home(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
        let mut context = Context::new();
        context.insert("total_tasks", &state.tasks.count_all()?);
        context.insert("important_tasks", &state.tasks.list_highlighted()?);
        context.insert("threshold", &IMPORTANT_PRIORITY);
        Ok(views::render(views::INDEX, &context)?)
    }

    // GET /read
    pub async fn read(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
        let mut context = Context::new();
        context.insert("task_count", &state.tasks.count_all()?);
        context.insert("tasks", &state.tasks.list_all(&LIST_ORDER)?);
        Ok(views::render(views::READ, &context)?)
    }

    // GET /create
    pub async fn create_form() -> Result<Html<String>, AppError> {
        render_create_form(&TaskForm::default(), None)
    }

    // POST /create
    pub async fn create(
        State(state): State<SharedState>,
        form: Result<Form<TaskForm>, FormRejection>,
    ) -> Result<Response, AppError> {
        let Form(form) = form?;
        match state.tasks.create(form.to_new_task()) {
            Ok(_) => Ok(redirect_to_list()),
            Err(TaskError::Validation(message)) => {
                tracing::debug!(%message, "create form rejected");
                let page = render_create_form(&form, Some(&message))?;
                Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
            }
            Err(e) => Err(e.into()),
        }
    }

    // GET /top/:id
    pub async fn top(State(state): State<SharedState>, Path(raw_id): Path<String>) -> Result<Response, AppError> {
        let Some(id) = parse_id(&raw_id) else { return task_not_found(&raw_id) };
        match state.tasks.toggle_top(id) {
            Ok(_) => Ok(redirect_to_list()),
            Err(TaskError::NotFound(_)) => task_not_found(&raw_id),
            Err(e) => Err(e.into()),
        }
    }

    // GET /edit/:id
    pub async fn edit_form(State(state): State<SharedState>, Path(raw_id): Path<String>) -> Result<Response, AppError> {
        let Some(id) = parse_id(&raw_id) else { return task_not_found(&raw_id) };
        let task = match state.tasks.get(id) {
            Ok(task) => task,
            Err(TaskError::NotFound(_)) => return task_not_found(&raw_id),
            Err(e) => return Err(e.into()),
        };

        let mut context = Context::new();
        context.insert("task", &task);
        context.insert("form", &TaskForm::from_task(&task));
        Ok(views::render(views::EDIT, &context)?.into_response())
    }

    // POST /edit/:id
    pub async fn edit(
        State(state): State<SharedState>,
        Path(raw_id): Path<String>,
        form: Result<Form<TaskForm>, FormRejection>,
    ) -> Result<Response, AppError> {
        let Form(form) = form?;
        let Some(id) = parse_id(&raw_id) else { return task_not_found(&raw_id) };
        if state.tasks.update(id, form.to_edit())? {
            Ok(redirect_to_list())
        } else {
            task_not_found(&raw_id)
        }
    }

    // GET /delete/:id
    pub async fn delete(State(state): State<SharedState>, Path(raw_id): Path<String>) -> Result<Response, AppError> {
        // Deleting something that is already gone is not an error.
        if let Some(id) = parse_id(&raw_id) {
            state.tasks.delete(id)?;
        }
        Ok(redirect_to_list())
    }
}

fn render_create_form(form: &TaskForm, error: Option<&str>) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("error", &error);
    Ok(views::render(views::CREATE, &context)?)
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn task_not_found(raw_id: &str) -> Result<Response, AppError> {
    not_found_page(&format!("No task with id {raw_id}."))
}

/// Plain 302, the status browsers follow with a GET after a form post.
fn redirect_to_list() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, LIST_PATH)]).into_response()
}
