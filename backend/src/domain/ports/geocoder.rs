//! Driven port for forward geocoding.

use async_trait::async_trait;

use crate::domain::{Geometry, TransientError};

use super::define_port_error;

define_port_error! {
    /// Errors raised by geocoding adapters.
    pub enum GeocoderError {
        /// The provider did not answer in time.
        Timeout { message: String } => "geocoder request timed out: {message}",
        /// The provider throttled the request.
        RateLimited { message: String } => "geocoder rate limited the request: {message}",
        /// Network failure or 5xx response.
        Transport { message: String } => "geocoder transport failed: {message}",
        /// The provider rejected the request, e.g. a bad access token.
        Rejected { message: String } => "geocoder rejected the request: {message}",
        /// The response body could not be understood.
        Decode { message: String } => "geocoder response was malformed: {message}",
    }
}

impl TransientError for GeocoderError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Transport { .. }
        )
    }
}

/// Free text to position.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geometry of the best match for `query`, or `None` when nothing
    /// matches.
    async fn forward_geocode(&self, query: &str) -> Result<Option<Geometry>, GeocoderError>;
}
