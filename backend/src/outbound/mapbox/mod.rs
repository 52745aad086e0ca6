//! Mapbox outbound adapters.
//!
//! A thin HTTP implementation of the `Geocoder` port.

mod dto;
mod http_geocoder;

pub use http_geocoder::MapboxGeocoder;
