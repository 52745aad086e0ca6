//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: define the listings marketplace in transport-agnostic terms.
//! Inbound adapters call the driving ports in [`ports`]; outbound adapters
//! implement the driven ones.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: domain failure with a stable code.
//! - `Listing`, `Review`, `User` and their value objects.
//! - `ListingService`, `UserAccountService`: driving port implementations.
//! - `RetryPolicy`: bounded retries for external providers.

pub mod access;
pub mod account;
pub mod account_service;
pub mod error;
pub mod listing;
pub mod listing_service;
pub mod listing_validation;
pub mod ports;
pub mod retry;
pub mod review;
pub mod trace_id;
pub mod user;

pub use self::access::{LISTING_MISSING_MESSAGE, NOT_OWNER_MESSAGE, ensure_owner};
pub use self::account::{
    LoginCredentials, NewAccount, PASSWORD_MIN_CHARS, Password, PasswordHash, SignupForm,
};
pub use self::account_service::{INVALID_LOGIN_MESSAGE, UserAccountService};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::listing::{
    Coordinates, CoordinatesError, Geometry, Listing, ListingChanges, ListingCursorKey,
    ListingFields, ListingId, ListingImage, NewListing, THUMBNAIL_TRANSFORM,
};
pub use self::listing_service::{ListingService, ListingServicePorts, location_not_found_message};
pub use self::listing_validation::{
    FieldIssue, FieldIssueCode, ListingPayload, ListingValidationErrors, TITLE_MAX_CHARS,
};
pub use self::retry::{RetryPolicy, Sleeper, TokioSleeper, TransientError};
pub use self::review::{Rating, RatingError, Review, ReviewId};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, USERNAME_MAX, USERNAME_MIN, User, UserId, UserValidationError, Username,
};
