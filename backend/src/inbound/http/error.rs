//! HTTP adapter mapping for domain errors.
//!
//! Domain failures become an HTML error page whose status derives from the
//! [`ErrorCode`]. Internal failures are redacted before rendering; the trace
//! identifier is echoed in both the page and the `trace-id` header.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use minijinja::context;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::flash::Flash;
use super::views;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ExternalServiceFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_page(status: StatusCode, shown: &Error) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    let rendered = views::render(
        "error.html",
        context! {
            status => heading,
            message => shown.message(),
            trace_id => shown.trace_id(),
            flash => Flash::default(),
        },
    );
    rendered.unwrap_or_else(|render_error| {
        error!(error = %render_error, "error page failed to render");
        match shown.trace_id() {
            Some(id) => format!("{}\nReference: {id}\n", shown.message()),
            None => format!("{}\n", shown.message()),
        }
    })
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code().as_str(), message = self.message(), "request failed");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder
            .content_type(ContentType::html())
            .body(error_page(status, &self.redacted()))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}
