//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session with the operations the marketplace needs:
//! the logged-in user, a post-login return target and flash notices.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Error, User, UserId};

use super::flash::{FLASH_KEY, Flash, FlashKind};

pub(crate) const USER_KEY: &str = "user";
pub(crate) const RETURN_TO_KEY: &str = "return_to";

/// Identity kept in the session cookie after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Account identifier.
    pub id: UserId,
    /// Login name shown in the navigation bar.
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
        }
    }
}

fn read_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

/// Only same-site absolute paths are followed after login.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Session attached to `req`.
    pub fn from_http_request(req: &HttpRequest) -> Self {
        Self(req.get_session())
    }

    /// Log `user` in. The session is renewed so a pre-login cookie cannot be
    /// replayed as an authenticated one.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_KEY, SessionUser::from(user))
            .map_err(write_failed)
    }

    /// Logged-in user, if any. A cookie that no longer decodes counts as
    /// logged out.
    pub fn current_user(&self) -> Result<Option<SessionUser>, Error> {
        match self.0.get::<SessionUser>(USER_KEY) {
            Ok(user) => Ok(user),
            Err(error) => {
                warn!(%error, "discarding unreadable session user");
                self.0.remove(USER_KEY);
                Ok(None)
            }
        }
    }

    /// Log the current user out, keeping pending notices.
    pub fn clear_user(&self) {
        self.0.remove(USER_KEY);
        self.0.remove(RETURN_TO_KEY);
    }

    /// Remember where to send the user after login.
    pub fn set_return_to(&self, target: &str) -> Result<(), Error> {
        if !is_local_path(target) {
            return Ok(());
        }
        self.0.insert(RETURN_TO_KEY, target).map_err(write_failed)
    }

    /// Consume the stored post-login target.
    pub fn take_return_to(&self) -> Option<String> {
        match self.0.remove_as::<String>(RETURN_TO_KEY)? {
            Ok(target) if is_local_path(&target) => Some(target),
            Ok(_) => None,
            Err(raw) => {
                warn!(%raw, "discarding unreadable return target");
                None
            }
        }
    }

    /// Queue a notice for the next rendered page.
    pub fn flash(&self, kind: FlashKind, message: impl Into<String>) -> Result<(), Error> {
        let mut flash = self
            .0
            .get::<Flash>(FLASH_KEY)
            .map_err(read_failed)?
            .unwrap_or_default();
        flash.push(kind, message);
        self.0.insert(FLASH_KEY, flash).map_err(write_failed)
    }

    /// Remove and return every queued notice.
    pub fn take_flash(&self) -> Flash {
        match self.0.remove_as::<Flash>(FLASH_KEY) {
            Some(Ok(flash)) => flash,
            Some(Err(raw)) => {
                warn!(%raw, "discarding unreadable flash messages");
                Flash::default()
            }
            None => Flash::default(),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_http_request(req)))
    }
}
