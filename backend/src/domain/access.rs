//! Ownership rules for listing mutations.

use super::{Error, Listing, UserId};

/// Notice shown when a non-owner tries to change a listing.
pub const NOT_OWNER_MESSAGE: &str = "You are not the owner of this listing";

/// Notice shown when a listing id does not resolve.
pub const LISTING_MISSING_MESSAGE: &str = "Listing Does Not Exist!";

/// Fail with [`crate::domain::ErrorCode::Forbidden`] unless `actor` owns
/// `listing`.
pub fn ensure_owner(listing: &Listing, actor: &UserId) -> Result<(), Error> {
    if listing.is_owned_by(actor) {
        Ok(())
    } else {
        Err(Error::forbidden(NOT_OWNER_MESSAGE))
    }
}
