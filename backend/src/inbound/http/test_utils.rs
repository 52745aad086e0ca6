//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, Route, web};

use crate::domain::{Error, User};

use super::session::SessionContext;
use super::session_config::{SessionSettings, session_middleware};

pub use super::session_config::SESSION_COOKIE_NAME as SESSION_COOKIE;

/// Session middleware with a fresh key and no `Secure` flag, for plain
/// HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    session_middleware(&SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    })
}

/// Session cookie set by `res`.
///
/// # Panics
/// Panics when the response did not set one.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Route that logs `user` in, for tests that need an authenticated cookie.
pub fn login_route(user: User) -> Route {
    web::get().to(move |session: SessionContext| {
        let user = user.clone();
        async move {
            session.persist_user(&user)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        }
    })
}
