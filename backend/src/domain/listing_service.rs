//! Listing use-cases.
//!
//! [`ListingService`] implements both listing driving ports. Mutations run in
//! a fixed order: ownership, validation, geocoding, image upload and finally
//! persistence. A rejected request never reaches a provider, and a location
//! that fails to geocode never leaves an unreferenced image in storage.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Cursor, Page, PageRequest};
use tracing::{info, warn};

use crate::domain::ports::{
    CreateListingRequest, DeleteListingRequest, Geocoder, ImageStore, ImageUpload,
    ListingCommand, ListingQuery, ListingRepository, ListingRepositoryError, UpdateListingRequest,
};
use crate::domain::{
    Error, FieldIssue, Geometry, LISTING_MISSING_MESSAGE, Listing, ListingChanges,
    ListingCursorKey, ListingId, ListingImage, NewListing, RetryPolicy, ensure_owner,
};

fn map_repository_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            Error::internal(format!("listing repository error: {message}"))
        }
    }
}

/// Message shown when a location does not geocode.
pub fn location_not_found_message(location: &str) -> String {
    format!("Could not find a location matching \"{location}\"")
}

/// Outbound ports used by [`ListingService`].
#[derive(Clone)]
pub struct ListingServicePorts {
    /// Listing persistence.
    pub repository: Arc<dyn ListingRepository>,
    /// Forward geocoding.
    pub geocoder: Arc<dyn Geocoder>,
    /// Image storage.
    pub images: Arc<dyn ImageStore>,
}

/// Listing command and query service.
#[derive(Clone)]
pub struct ListingService {
    ports: ListingServicePorts,
    retry: RetryPolicy,
}

impl ListingService {
    /// Create the service; `retry` governs geocoding and upload calls.
    pub const fn new(ports: ListingServicePorts, retry: RetryPolicy) -> Self {
        Self { ports, retry }
    }

    async fn upload(&self, upload: &ImageUpload) -> Result<ListingImage, Error> {
        let images = &self.ports.images;
        self.retry
            .run("image_upload", move || images.upload(upload))
            .await
            .map_err(|error| {
                warn!(kind = error.kind(), %error, "image upload failed");
                Error::external_service_failure("Image upload failed, please try again later")
            })
    }

    async fn geocode(&self, location: &str) -> Result<Geometry, Error> {
        let geocoder = &self.ports.geocoder;
        self.retry
            .run("forward_geocode", move || geocoder.forward_geocode(location))
            .await
            .map_err(|error| {
                warn!(kind = error.kind(), %error, "forward geocoding failed");
                Error::external_service_failure(
                    "Location lookup is unavailable, please try again later",
                )
            })?
            .ok_or_else(|| Error::invalid_request(location_not_found_message(location)))
    }
}

#[async_trait]
impl ListingCommand for ListingService {
    async fn create(&self, request: CreateListingRequest) -> Result<Listing, Error> {
        let CreateListingRequest {
            owner,
            payload,
            image,
        } = request;

        let validated = payload.validate();
        let Some(upload) = image else {
            let mut errors = validated.err().unwrap_or_default();
            errors.push(FieldIssue::required("image"));
            return Err(errors.into());
        };
        let fields = validated?;

        let geometry = self.geocode(&fields.location).await?;
        let image = self.upload(&upload).await?;

        let listing = self
            .ports
            .repository
            .create(&NewListing {
                id: ListingId::random(),
                fields,
                geometry: Some(geometry),
                image: Some(image),
                owner,
            })
            .await
            .map_err(map_repository_error)?;

        info!(listing_id = %listing.id, owner = %owner, "listing created");
        Ok(listing)
    }

    async fn update(&self, request: UpdateListingRequest) -> Result<(), Error> {
        let UpdateListingRequest {
            actor,
            current,
            payload,
            image,
        } = request;
        ensure_owner(&current, &actor)?;

        let fields = payload.validate()?;

        let geometry = if fields.location != current.fields.location || current.geometry.is_none()
        {
            Some(self.geocode(&fields.location).await?)
        } else {
            current.geometry
        };
        let image = match image {
            Some(upload) => Some(self.upload(&upload).await?),
            None => current.image,
        };

        let updated = self
            .ports
            .repository
            .update(&ListingChanges {
                id: current.id,
                fields,
                geometry,
                image,
            })
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(Error::not_found(LISTING_MISSING_MESSAGE));
        }

        info!(listing_id = %current.id, actor = %actor, "listing updated");
        Ok(())
    }

    async fn delete(&self, request: DeleteListingRequest) -> Result<(), Error> {
        let DeleteListingRequest { actor, current } = request;
        ensure_owner(&current, &actor)?;

        let removed = self
            .ports
            .repository
            .delete(&current.id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(LISTING_MISSING_MESSAGE));
        }

        info!(listing_id = %current.id, actor = %actor, "listing deleted");
        Ok(())
    }
}

#[async_trait]
impl ListingQuery for ListingService {
    async fn list(&self, request: &PageRequest) -> Result<Page<Listing>, Error> {
        let after = request
            .cursor()
            .map(|token| Cursor::<ListingCursorKey>::decode(token).map(Cursor::into_key))
            .transpose()
            .map_err(|error| Error::invalid_request(format!("invalid page cursor: {error}")))?;

        let rows = self
            .ports
            .repository
            .list(after, request.fetch_limit())
            .await
            .map_err(map_repository_error)?;

        Page::from_lookahead(rows, request.limit(), |last| {
            Cursor::new(last.cursor_key()).encode()
        })
        .map_err(|error| Error::internal(format!("failed to encode page cursor: {error}")))
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, Error> {
        self.ports
            .repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
