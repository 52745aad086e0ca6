//! Registration and login use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountService, NewUserRecord, PasswordHasher, PasswordHasherError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Error, LoginCredentials, PasswordHash, SignupForm, User, UserId};

/// Notice shown for any failed login.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password";

/// Message for a taken username.
pub const USERNAME_TAKEN_MESSAGE: &str = "A user with the given username is already registered";

/// Verified in place of a stored hash when the username is unknown. Must
/// stay a parseable Argon2id PHC string with production cost parameters.
pub(crate) const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
    gZiV/M1gPc22ElAH/Jh1Hw$\
    CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername { .. } => Error::conflict(USERNAME_TAKEN_MESSAGE),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("password hasher failed: {error}"))
}

/// Account service backed by a user repository and a password hasher.
#[derive(Clone)]
pub struct UserAccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserAccountService {
    /// Create the service.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl AccountService for UserAccountService {
    async fn register(&self, form: SignupForm) -> Result<User, Error> {
        let account = form.validate()?;
        let password_hash = self
            .hasher
            .hash(&account.password)
            .await
            .map_err(map_hasher_error)?;

        let user = self
            .users
            .create(&NewUserRecord {
                id: UserId::random(),
                username: account.username,
                email: account.email,
                password_hash,
            })
            .await
            .map_err(map_repository_error)?;

        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = match credentials.username() {
            Ok(username) => self
                .users
                .find_credentials(&username)
                .await
                .map_err(map_repository_error)?,
            Err(_) => None,
        };
        let Some(stored) = stored else {
            let dummy = PasswordHash::new(DUMMY_PASSWORD_HASH);
            if let Err(error) = self.hasher.verify(&credentials.password, &dummy).await {
                warn!(%error, "dummy password verification failed");
            }
            return Err(Error::unauthorized(INVALID_LOGIN_MESSAGE));
        };

        let matches = self
            .hasher
            .verify(&credentials.password, &stored.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            warn!(user_id = %stored.user.id, "password mismatch");
            return Err(Error::unauthorized(INVALID_LOGIN_MESSAGE));
        }
        Ok(stored.user)
    }
}
