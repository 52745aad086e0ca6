//! DTOs for decoding Cloudinary upload responses.

use serde::Deserialize;

use crate::domain::ListingImage;

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    pub(super) secure_url: String,
    pub(super) public_id: String,
}

impl UploadResponseDto {
    pub(super) fn into_domain(self) -> Result<ListingImage, String> {
        if self.secure_url.trim().is_empty() || self.public_id.trim().is_empty() {
            return Err("upload response carried an empty secure_url or public_id".to_owned());
        }
        Ok(ListingImage {
            url: self.secure_url,
            filename: self.public_id,
        })
    }
}
