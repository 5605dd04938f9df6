use std::any::Any;

use axum::{
    extract::rejection::FormRejection,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tera::Context;
use thiserror::Error;

use crate::{data_access::task_repository::TaskError, reporting::error_reporter::FailureReport, web_api::views};

/// Any failure a handler does not recover from. Rendered as the error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("template rendering failed")]
    Template(#[from] tera::Error),
    #[error("malformed form submission")]
    Form(#[from] FormRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Keep axum's status (415, 422, ...) but still render and report the page.
            AppError::Form(rejection) => error_page(rejection.status(), &rejection.body_text()),
            other => error_page(StatusCode::INTERNAL_SERVER_ERROR, &describe(&other)),
        }
    }
}

/// Renders `error.html` and tags the response for the error reporter.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("error", message);

    let mut response = match views::render(views::ERROR, &context) {
        Ok(html) => (status, html).into_response(),
        Err(e) => (status, format!("{message}\n\n(error page failed: {e})")).into_response(),
    };
    response.extensions_mut().insert(FailureReport::new(message));
    response
}

/// Renders `not_found.html` with a 404.
pub fn not_found_page(message: &str) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("message", message);
    Ok((StatusCode::NOT_FOUND, views::render(views::NOT_FOUND, &context)?).into_response())
}

pub async fn fallback(uri: Uri) -> Result<Response, AppError> {
    not_found_page(&format!("Nothing lives at {}.", uri.path()))
}

/// `CatchPanicLayer` hook: a panicking handler still gets the error page.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error_page(StatusCode::INTERNAL_SERVER_ERROR, &format!("handler panicked: {detail}"))
}

/// Joins an error with its chain of sources.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_access::task_store::StoreError;

    #[test]
    fn app_error_renders_error_page() {
        let err = AppError::from(TaskError::from(StoreError::Redb("disk full".into())));

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<FailureReport>().unwrap();
        assert_eq!(report.message, "redb: disk full");
    }

    #[test]
    fn panic_payloads_are_described() {
        let response = handle_panic(Box::new("kaboom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<FailureReport>().unwrap().message,
            "handler panicked: kaboom"
        );

        let response = handle_panic(Box::new(String::from("owned")));
        assert_eq!(
            response.extensions().get::<FailureReport>().unwrap().message,
            "handler panicked: owned"
        );

        let response = handle_panic(Box::new(42_u8));
        assert_eq!(
            response.extensions().get::<FailureReport>().unwrap().message,
            "handler panicked: unknown panic"
        );
    }

    #[test]
    fn not_found_is_not_reported() {
        let response = not_found_page("no such task").unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<FailureReport>().is_none());
    }
}
