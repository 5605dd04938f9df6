//! HTML templates, compiled into the binary.

use std::sync::LazyLock;

use axum::response::Html;
use tera::{Context, Tera};

pub const INDEX: &str = "index.html";
pub const READ: &str = "read.html";
pub const CREATE: &str = "create.html";
pub const EDIT: &str = "edit.html";
pub const NOT_FOUND: &str = "not_found.html";
pub const ERROR: &str = "error.html";

static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        (INDEX, include_str!("../../templates/index.html")),
        (READ, include_str!("../../templates/read.html")),
        (CREATE, include_str!("../../templates/create.html")),
        (EDIT, include_str!("../../templates/edit.html")),
        (NOT_FOUND, include_str!("../../templates/not_found.html")),
        (ERROR, include_str!("../../templates/error.html")),
    ])
    .expect("embedded templates must parse");
    tera
});

pub fn render(template: &str, context: &Context) -> Result<Html<String>, tera::Error> {
    TEMPLATES.render(template, context).map(Html)
}
