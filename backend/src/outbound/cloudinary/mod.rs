//! Cloudinary outbound adapters.
//!
//! A signed-upload implementation of the `ImageStore` port.

mod dto;
mod http_store;
mod signature;

pub use http_store::{CloudinaryCredentials, CloudinaryImageStore};
