//! Reqwest-backed Cloudinary image store.
//!
//! Uploads are signed with the account secret and sent as multipart forms.
//! Only the returned `secure_url` and `public_id` are kept.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::UploadResponseDto;
use super::signature::{SIGNATURE_ALGORITHM, sign};
use crate::domain::ListingImage;
use crate::domain::ports::{ImageStore, ImageStoreError, ImageUpload};
use crate::outbound::http_body::{StatusClass, classify_status, status_message};

/// Account identity used to sign uploads.
pub struct CloudinaryCredentials {
    /// Cloud (account) name used in the upload path.
    pub cloud_name: String,
    /// Public API key.
    pub api_key: String,
    /// API secret; never sent over the wire.
    pub api_secret: Zeroizing<String>,
}

/// Image store performing signed uploads to one Cloudinary folder.
pub struct CloudinaryImageStore {
    client: Client,
    upload_url: Url,
    api_key: String,
    api_secret: Zeroizing<String>,
    folder: String,
    clock: Arc<dyn Clock>,
}

impl CloudinaryImageStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// upload URL cannot be derived from `base_url`.
    pub fn new(
        base_url: Url,
        credentials: CloudinaryCredentials,
        folder: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ImageStoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ImageStoreError::transport(error.to_string()))?;
        let upload_url = upload_url(&base_url, &credentials.cloud_name)?;
        Ok(Self {
            client,
            upload_url,
            api_key: credentials.api_key,
            api_secret: credentials.api_secret,
            folder: folder.into(),
            clock,
        })
    }

    fn form(&self, upload: &ImageUpload) -> Result<Form, ImageStoreError> {
        let timestamp = self.clock.utc().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", self.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            self.api_secret.as_str(),
        );

        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(&upload.content_type)
            .map_err(|error| {
                ImageStoreError::rejected(format!("invalid content type: {error}"))
            })?;

        Ok(Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", SIGNATURE_ALGORITHM))
    }
}

fn upload_url(base_url: &Url, cloud_name: &str) -> Result<Url, ImageStoreError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ImageStoreError::rejected("storage base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(["v1_1", cloud_name, "image", "upload"]);
    Ok(url)
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, upload: &ImageUpload) -> Result<ListingImage, ImageStoreError> {
        let response = self
            .client
            .post(self.upload_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(self.form(upload)?)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let image = parse_image(body.as_ref())?;
        debug!(public_id = %image.filename, bytes = upload.bytes.len(), "image stored");
        Ok(image)
    }
}

fn parse_image(body: &[u8]) -> Result<ListingImage, ImageStoreError> {
    let decoded: UploadResponseDto = serde_json::from_slice(body).map_err(|error| {
        ImageStoreError::decode(format!("invalid upload JSON payload: {error}"))
    })?;
    decoded.into_domain().map_err(ImageStoreError::decode)
}

fn map_transport_error(error: reqwest::Error) -> ImageStoreError {
    if error.is_timeout() {
        ImageStoreError::timeout(error.to_string())
    } else {
        ImageStoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageStoreError {
    let message = status_message(status, body);
    match classify_status(status) {
        StatusClass::RateLimited => ImageStoreError::rate_limited(message),
        StatusClass::Timeout => ImageStoreError::timeout(message),
        StatusClass::Rejected => ImageStoreError::rejected(message),
        StatusClass::Transport => ImageStoreError::transport(message),
    }
}
