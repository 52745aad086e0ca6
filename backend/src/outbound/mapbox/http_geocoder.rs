//! Reqwest-backed Mapbox forward geocoder.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding into a domain geometry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::FeatureCollectionDto;
use crate::domain::Geometry;
use crate::domain::ports::{Geocoder, GeocoderError};
use crate::outbound::http_body::{StatusClass, classify_status, status_message};

const RESULT_LIMIT: &str = "1";

/// Forward geocoder calling the Mapbox places endpoint.
pub struct MapboxGeocoder {
    client: Client,
    base_url: Url,
    access_token: Zeroizing<String>,
}

impl MapboxGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token: Zeroizing::new(access_token.into()),
        })
    }

    fn request_url(&self, query: &str) -> Result<Url, GeocoderError> {
        let file = format!("{query}.json");
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GeocoderError::rejected("geocoder base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", file.as_str()]);
        url.query_pairs_mut()
            .append_pair("access_token", self.access_token.as_str())
            .append_pair("limit", RESULT_LIMIT);
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Option<Geometry>, GeocoderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.request_url(query)?)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let geometry = parse_first_geometry(body.as_ref())?;
        debug!(matched = geometry.is_some(), "forward geocode completed");
        Ok(geometry)
    }
}

fn parse_first_geometry(body: &[u8]) -> Result<Option<Geometry>, GeocoderError> {
    let decoded: FeatureCollectionDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid geocoding JSON payload: {error}"))
    })?;
    decoded
        .into_first_geometry()
        .map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    if error.is_timeout() {
        GeocoderError::timeout(error.to_string())
    } else {
        GeocoderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    let message = status_message(status, body);
    match classify_status(status) {
        StatusClass::RateLimited => GeocoderError::rate_limited(message),
        StatusClass::Timeout => GeocoderError::timeout(message),
        StatusClass::Rejected => GeocoderError::rejected(message),
        StatusClass::Transport => GeocoderError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Non-network coverage for URL building and response decoding.

    use super::*;
    use crate::domain::Coordinates;
    use rstest::rstest;

    fn geocoder(base: &str) -> MapboxGeocoder {
        MapboxGeocoder::new(
            Url::parse(base).expect("base url"),
            "pk.test-token",
            Duration::from_secs(1),
        )
        .expect("client builds")
    }

    #[rstest]
    #[case("https://api.mapbox.com")]
    #[case("https://api.mapbox.com/")]
    fn builds_places_url_with_encoded_query(#[case] base: &str) {
        let url = geocoder(base)
            .request_url("New York, NY")
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/New%20York,%20NY.json\
             ?access_token=pk.test-token&limit=1"
        );
    }

    #[test]
    fn slashes_in_the_query_stay_inside_one_segment() {
        let url = geocoder("https://api.mapbox.com")
            .request_url("AC/DC Lane")
            .expect("url builds");
        assert!(url.path().ends_with("/mapbox.places/AC%2FDC%20Lane.json"));
    }

    #[test]
    fn decodes_first_feature_as_point() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                { "geometry": { "type": "Point", "coordinates": [-118.7798, 34.0259] } },
                { "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } }
            ]
        }"#;
        let geometry = parse_first_geometry(body.as_bytes()).expect("decodes");
        let expected = Coordinates::new(-118.7798, 34.0259).expect("in range");
        assert_eq!(geometry, Some(Geometry::point(expected)));
    }

    #[test]
    fn empty_feature_list_is_no_match() {
        let geometry = parse_first_geometry(br#"{"features": []}"#).expect("decodes");
        assert_eq!(geometry, None);
    }

    #[rstest]
    #[case::not_json(b"<html>".as_slice())]
    #[case::out_of_range(br#"{"features":[{"geometry":{"type":"Point","coordinates":[200.0,1.0]}}]}"#.as_slice())]
    #[case::polygon(br#"{"features":[{"geometry":{"type":"Polygon","coordinates":[1.0,1.0]}}]}"#.as_slice())]
    fn malformed_payloads_are_decode_errors(#[case] body: &[u8]) {
        let error = parse_first_geometry(body).expect_err("decode fails");
        assert!(matches!(error, GeocoderError::Decode { .. }));
    }

    #[rstest]
    #[case(StatusCode::TOO_MANY_REQUESTS, "rate_limited")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "timeout")]
    #[case(StatusCode::UNAUTHORIZED, "rejected")]
    #[case(StatusCode::SERVICE_UNAVAILABLE, "transport")]
    fn maps_statuses_to_port_errors(#[case] status: StatusCode, #[case] kind: &str) {
        let error = map_status_error(status, br#"{"message":"Not Authorized - Invalid Token"}"#);
        assert_eq!(error.kind(), kind);
    }
}
