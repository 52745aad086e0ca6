//! Driven port for listing persistence.

use async_trait::async_trait;

use crate::domain::{Listing, ListingChanges, ListingCursorKey, ListingId, NewListing};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
    }
}

/// Listing storage.
///
/// Reads resolve the owner. [`ListingRepository::find_by_id`] additionally
/// resolves reviews and their authors; index pages get listings with an
/// empty review list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Up to `limit` listings, newest first, strictly after `after`.
    async fn list(
        &self,
        after: Option<ListingCursorKey>,
        limit: usize,
    ) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// One listing with owner and reviews, or `None` when absent.
    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Insert a listing and return it as stored.
    async fn create(&self, listing: &NewListing) -> Result<Listing, ListingRepositoryError>;

    /// Overwrite the mutable fields. Returns `false` when the listing is gone.
    async fn update(&self, changes: &ListingChanges) -> Result<bool, ListingRepositoryError>;

    /// Remove the listing and its review links. Returns `false` when nothing
    /// was removed.
    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError>;
}
