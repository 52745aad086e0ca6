//! Sign-up and login inputs.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, Error, UserValidationError, Username};

/// Minimum password length in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Plain-text password held only for the duration of a request.
///
/// The buffer is wiped on drop and never printed.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap submitted text without validation, as used for login.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Expose the secret to a hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Encoded password hash (PHC string format). Opaque to the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash loaded from storage or produced by a hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Raw sign-up form.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    /// Requested login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Chosen password.
    pub password: String,
}

/// Validated sign-up request.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login name.
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// Password to hash.
    pub password: Password,
}

impl SignupForm {
    /// Validate all fields, reporting every failure in one message.
    pub fn validate(self) -> Result<NewAccount, Error> {
        let Self {
            username,
            email,
            password,
        } = self;
        let password = Password::new(password);
        let mut messages = Vec::new();

        let username = Username::new(username.trim())
            .map_err(|error| messages.push(error.to_string()))
            .ok();
        let email = Email::new(email)
            .map_err(|error| messages.push(error.to_string()))
            .ok();
        if password.expose().chars().count() < PASSWORD_MIN_CHARS {
            messages.push(format!(
                "\"password\" must be at least {PASSWORD_MIN_CHARS} characters long"
            ));
        }

        match (username, email) {
            (Some(username), Some(email)) if messages.is_empty() => Ok(NewAccount {
                username,
                email,
                password,
            }),
            _ => Err(Error::invalid_request(messages.join(","))),
        }
    }
}

/// Login attempt.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    /// Submitted login name.
    pub username: String,
    /// Submitted password.
    pub password: Password,
}

impl LoginCredentials {
    /// Username when it is well formed; malformed names cannot match an
    /// account.
    pub fn username(&self) -> Result<Username, UserValidationError> {
        Username::new(self.username.trim())
    }
}
