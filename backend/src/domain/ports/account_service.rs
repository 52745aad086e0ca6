//! Driving port for registration and login.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SignupForm, User};

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Validate the form, hash the password and store a new account.
    ///
    /// A taken username yields [`crate::domain::ErrorCode::Conflict`].
    async fn register(&self, form: SignupForm) -> Result<User, Error>;

    /// Verify credentials. Unknown users and wrong passwords both yield
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
