//! Shared HTTP adapter state.
//!
//! Handlers accept this via `actix_web::web::Data` so they only depend on
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, ListingCommand, ListingQuery};

/// Upload ceiling applied when none is configured.
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Listing mutations.
    pub listings: Arc<dyn ListingCommand>,
    /// Listing reads.
    pub listings_query: Arc<dyn ListingQuery>,
    /// Registration and login.
    pub accounts: Arc<dyn AccountService>,
    /// Public map token handed to the browser map script.
    pub map_token: String,
    /// Largest accepted image upload in bytes.
    pub upload_max_bytes: usize,
}

impl HttpState {
    /// Bundle the ports with default presentation settings.
    pub fn new(
        listings: Arc<dyn ListingCommand>,
        listings_query: Arc<dyn ListingQuery>,
        accounts: Arc<dyn AccountService>,
    ) -> Self {
        Self {
            listings,
            listings_query,
            accounts,
            map_token: String::new(),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        }
    }

    /// Token embedded in listing pages for client-side maps.
    #[must_use]
    pub fn with_map_token(mut self, token: impl Into<String>) -> Self {
        self.map_token = token.into();
        self
    }

    /// Override the upload ceiling.
    #[must_use]
    pub const fn with_upload_max_bytes(mut self, max_bytes: usize) -> Self {
        self.upload_max_bytes = max_bytes;
        self
    }
}
