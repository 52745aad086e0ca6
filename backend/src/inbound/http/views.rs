//! Server-rendered pages.
//!
//! Templates are compiled into the binary and loaded once into a shared
//! `minijinja` environment. Every page extends `layout.html`, which expects
//! `current_user` and `flash` in its context; [`render_page`] supplies both.

use std::sync::OnceLock;

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use minijinja::{Environment, Value, context};
use tracing::error;

use crate::domain::Error;

use super::session::SessionContext;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../../templates/layout.html")),
    ("error.html", include_str!("../../../templates/error.html")),
    (
        "listings/index.html",
        include_str!("../../../templates/listings/index.html"),
    ),
    (
        "listings/show.html",
        include_str!("../../../templates/listings/show.html"),
    ),
    (
        "listings/new.html",
        include_str!("../../../templates/listings/new.html"),
    ),
    (
        "listings/edit.html",
        include_str!("../../../templates/listings/edit.html"),
    ),
    (
        "users/signup.html",
        include_str!("../../../templates/users/signup.html"),
    ),
    (
        "users/login.html",
        include_str!("../../../templates/users/login.html"),
    ),
];

static ENVIRONMENT: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENVIRONMENT.get_or_init(|| {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            if let Err(err) = env.add_template(name, source) {
                error!(template = name, error = %err, "template failed to compile");
            }
        }
        env
    })
}

/// Render `template` with `ctx`.
pub fn render(template: &str, ctx: Value) -> Result<String, Error> {
    environment()
        .get_template(template)
        .and_then(|tmpl| tmpl.render(ctx))
        .map_err(|err| Error::internal(format!("failed to render {template}: {err}")))
}

/// Render a full page for the current session, consuming pending flash
/// notices.
pub fn render_page(
    session: &SessionContext,
    template: &str,
    ctx: Value,
) -> Result<HttpResponse, Error> {
    let current_user = session.current_user()?;
    let flash = session.take_flash();
    let body = render(
        template,
        context! {
            current_user => current_user,
            flash => flash,
            ..ctx
        },
    )?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
