//! Driving port for listing reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Listing, ListingId};

/// Listing read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// One page of listings, newest first.
    async fn list(&self, request: &PageRequest) -> Result<Page<Listing>, Error>;

    /// One listing with owner and reviews resolved.
    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, Error>;
}
