//! Driven port for user account persistence.
use async_trait::async_trait;

use crate::domain::{Email, PasswordHash, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } => "username already registered: {username}",
    }
}

/// Account about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Identifier assigned by the service.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// Encoded password hash.
    pub password_hash: PasswordHash,
}

/// Stored account together with its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account.
    pub user: User,
    /// Encoded password hash.
    pub password_hash: PasswordHash,
}

/// User account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account; a taken username yields
    /// [`UserRepositoryError::DuplicateUsername`].
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError>;

    /// Look up an account and its hash by login name.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;
}
