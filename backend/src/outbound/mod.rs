//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **mapbox**: forward geocoding over HTTP
//! - **cloudinary**: signed image uploads over HTTP
//! - **password**: Argon2id password hashing
//!
//! Adapters translate between domain types and provider representations and
//! contain no business logic.

mod http_body;

pub mod cloudinary;
pub mod mapbox;
pub mod password;
pub mod persistence;
