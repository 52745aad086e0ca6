//! Driven port for listing image storage.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{ListingImage, TransientError};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStoreError {
        /// The provider did not answer in time.
        Timeout { message: String } => "image upload timed out: {message}",
        /// The provider throttled the request.
        RateLimited { message: String } => "image upload was rate limited: {message}",
        /// Network failure or 5xx response.
        Transport { message: String } => "image upload transport failed: {message}",
        /// The provider rejected the upload, e.g. a bad signature.
        Rejected { message: String } => "image upload was rejected: {message}",
        /// The response body could not be understood.
        Decode { message: String } => "image upload response was malformed: {message}",
    }
}

impl TransientError for ImageStoreError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Transport { .. }
        )
    }
}

/// Image file received from a form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-side file name.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Remote object storage for listing images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `upload` and return the reference to keep on the listing.
    async fn upload(&self, upload: &ImageUpload) -> Result<ListingImage, ImageStoreError>;
}

/// Store that keeps nothing and hands back a predictable reference.
#[derive(Debug, Clone, Default)]
pub struct FixtureImageStore;

#[async_trait]
impl ImageStore for FixtureImageStore {
    async fn upload(&self, upload: &ImageUpload) -> Result<ListingImage, ImageStoreError> {
        Ok(ListingImage {
            url: format!("https://images.invalid/upload/{}", upload.filename),
            filename: format!("fixture/{}", upload.filename),
        })
    }
}
