//! Form method override.
//!
//! HTML forms can only submit `GET` and `POST`. A `POST` whose query string
//! carries `_method=PUT`, `_method=PATCH` or `_method=DELETE` is rewritten
//! to that method before routing; any other value is ignored.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use futures_util::future::{Ready, ready};
use tracing::debug;

const OVERRIDE_PARAM: &str = "_method";

/// Middleware factory rewriting overridden form methods.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use wanderlust::middleware::MethodOverride;
///
/// let _app = App::new().wrap(MethodOverride);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MethodOverride;

impl<S, B> Transform<S, ServiceRequest> for MethodOverride
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MethodOverrideMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MethodOverrideMiddleware { service }))
    }
}

/// Service wrapper produced by [`MethodOverride`].
pub struct MethodOverrideMiddleware<S> {
    service: S,
}

/// Method requested through `_method`, if the query names a supported one.
fn overridden_method(query: &str) -> Option<Method> {
    let requested = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == OVERRIDE_PARAM)
        .map(|(_, value)| value.to_ascii_uppercase())?;
    match requested.as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

impl<S, B> Service<ServiceRequest> for MethodOverrideMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if req.method() == Method::POST {
            if let Some(method) = overridden_method(req.query_string()) {
                debug!(%method, path = %req.path(), "form method override");
                req.head_mut().method = method;
            }
        }
        self.service.call(req)
    }
}
