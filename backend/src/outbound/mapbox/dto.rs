//! DTOs for decoding Mapbox forward geocoding responses.

use serde::Deserialize;

use crate::domain::{Coordinates, Geometry};

#[derive(Debug, Deserialize)]
pub(super) struct FeatureCollectionDto {
    #[serde(default)]
    pub(super) features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureDto {
    pub(super) geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    #[serde(rename = "type")]
    pub(super) kind: String,
    pub(super) coordinates: [f64; 2],
}

impl FeatureCollectionDto {
    /// Geometry of the first feature, if any.
    pub(super) fn into_first_geometry(self) -> Result<Option<Geometry>, String> {
        let Some(feature) = self.features.into_iter().next() else {
            return Ok(None);
        };
        feature.geometry.into_domain().map(Some)
    }
}

impl GeometryDto {
    fn into_domain(self) -> Result<Geometry, String> {
        if self.kind != "Point" {
            return Err(format!("unsupported geometry type {}", self.kind));
        }
        let [longitude, latitude] = self.coordinates;
        let point = Coordinates::new(longitude, latitude).map_err(|error| error.to_string())?;
        Ok(Geometry::point(point))
    }
}
