//! Driving port for listing mutations.
//!
//! Inbound adapters pass the listing they already fetched through the
//! ownership guard so the use-case does not repeat the lookup.

use async_trait::async_trait;

use crate::domain::{Error, Listing, ListingPayload, UserId};

use super::ImageUpload;

/// Request to create a listing.
#[derive(Debug, Clone)]
pub struct CreateListingRequest {
    /// Authenticated creator; becomes the owner.
    pub owner: UserId,
    /// Submitted form fields.
    pub payload: ListingPayload,
    /// Submitted image file. Required.
    pub image: Option<ImageUpload>,
}

/// Request to update a listing.
#[derive(Debug, Clone)]
pub struct UpdateListingRequest {
    /// Authenticated requester.
    pub actor: UserId,
    /// Listing as currently stored.
    pub current: Listing,
    /// Submitted form fields.
    pub payload: ListingPayload,
    /// Replacement image; `None` keeps the existing one.
    pub image: Option<ImageUpload>,
}

/// Request to delete a listing.
#[derive(Debug, Clone)]
pub struct DeleteListingRequest {
    /// Authenticated requester.
    pub actor: UserId,
    /// Listing as currently stored.
    pub current: Listing,
}

/// Listing mutation use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Validate, upload, geocode and persist a new listing.
    async fn create(&self, request: CreateListingRequest) -> Result<Listing, Error>;

    /// Validate and apply changes to an owned listing.
    async fn update(&self, request: UpdateListingRequest) -> Result<(), Error>;

    /// Delete an owned listing.
    async fn delete(&self, request: DeleteListingRequest) -> Result<(), Error>;
}
