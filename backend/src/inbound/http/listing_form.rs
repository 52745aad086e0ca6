//! Multipart listing form decoding.
//!
//! Text parts named `listing[title]`, `listing[description]`,
//! `listing[price]`, `listing[location]` and `listing[country]` fill a
//! [`ListingPayload`]; the `listing[image]` part becomes an [`ImageUpload`].
//! A file input left empty arrives as a part with a blank file name and is
//! treated as no file.

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;

use crate::domain::ports::ImageUpload;
use crate::domain::{Error, ListingPayload};

/// Image MIME types accepted for listing photos.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Rejection for uploads of any other type.
pub const IMAGE_TYPE_MESSAGE: &str = "Only .png, .jpg and .jpeg images are allowed";

const IMAGE_FIELD: &str = "listing[image]";
const TEXT_FIELD_MAX_BYTES: usize = 64 * 1024;

/// Decoded listing submission.
#[derive(Debug, Default)]
pub struct ListingForm {
    /// Text fields.
    pub payload: ListingPayload,
    /// Image part, when a file was chosen.
    pub image: Option<ImageUpload>,
}

fn malformed(error: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed form submission: {error}"))
}

fn text_slot<'a>(payload: &'a mut ListingPayload, name: &str) -> Option<&'a mut Option<String>> {
    match name {
        "listing[title]" => Some(&mut payload.title),
        "listing[description]" => Some(&mut payload.description),
        "listing[price]" => Some(&mut payload.price),
        "listing[location]" => Some(&mut payload.location),
        "listing[country]" => Some(&mut payload.country),
        _ => None,
    }
}

async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Ok(None);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(Some(bytes))
}

async fn drain(field: &mut Field) -> Result<(), Error> {
    while field.try_next().await.map_err(malformed)?.is_some() {}
    Ok(())
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, Error> {
    let bytes = read_limited(field, TEXT_FIELD_MAX_BYTES)
        .await?
        .ok_or_else(|| Error::invalid_request(format!("\"{name}\" is too long")))?;
    String::from_utf8(bytes)
        .map_err(|_| Error::invalid_request(format!("\"{name}\" must be valid text")))
}

async fn read_image(field: &mut Field, max_bytes: usize) -> Result<Option<ImageUpload>, Error> {
    let filename = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .map(str::trim)
        .unwrap_or_default()
        .to_owned();
    if filename.is_empty() {
        drain(field).await?;
        return Ok(None);
    }

    let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(Error::invalid_request(IMAGE_TYPE_MESSAGE));
    }

    let bytes = read_limited(field, max_bytes).await?.ok_or_else(|| {
        Error::invalid_request(format!("Image must be at most {max_bytes} bytes"))
    })?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageUpload {
        filename,
        content_type,
        bytes,
    }))
}

/// Read every part of a listing form.
pub async fn read_listing_form(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<ListingForm, Error> {
    let mut form = ListingForm::default();
    while let Some(mut field) = multipart.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == IMAGE_FIELD {
            form.image = read_image(&mut field, max_image_bytes).await?;
            continue;
        }
        let value = read_text(&mut field, &name).await?;
        if let Some(slot) = text_slot(&mut form.payload, &name) {
            *slot = Some(value);
        }
    }
    Ok(form)
}
