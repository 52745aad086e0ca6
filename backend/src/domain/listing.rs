//! Listing aggregate and its value objects.
//!
//! A [`Listing`] is read back with its owner and reviews resolved. Writes go
//! through [`NewListing`] and [`ListingChanges`], neither of which can touch
//! the owner once the listing exists.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Review, User, UserId};

/// Stable listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from a path segment; `None` for anything that is
    /// not a UUID.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ListingId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Coordinates outside the WGS84 range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("coordinates out of range: longitude {longitude}, latitude {latitude}")]
pub struct CoordinatesError {
    /// Rejected longitude.
    pub longitude: f64,
    /// Rejected latitude.
    pub latitude: f64,
}

/// Longitude/latitude pair, serialised GeoJSON style as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    longitude: f64,
    latitude: f64,
}

impl Coordinates {
    /// Validate a coordinate pair.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinatesError> {
        let in_range = (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude);
        if !in_range {
            return Err(CoordinatesError {
                longitude,
                latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }
}

impl TryFrom<[f64; 2]> for Coordinates {
    type Error = CoordinatesError;

    fn try_from([longitude, latitude]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.longitude, value.latitude]
    }
}

/// GeoJSON geometry attached to a geocoded listing.
///
/// # Examples
/// ```
/// use wanderlust::domain::{Coordinates, Geometry};
///
/// let point = Geometry::point(Coordinates::new(-0.1276, 51.5072).expect("in range"));
/// let json = serde_json::to_value(point).expect("serialise");
/// assert_eq!(json["type"], "Point");
/// assert_eq!(json["coordinates"][0], -0.1276);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// Position of the point.
        coordinates: Coordinates,
    },
}

impl Geometry {
    /// Build a point geometry.
    pub const fn point(coordinates: Coordinates) -> Self {
        Self::Point { coordinates }
    }

    /// Coordinates of the geometry.
    pub const fn coordinates(&self) -> Coordinates {
        match self {
            Self::Point { coordinates } => *coordinates,
        }
    }
}

/// Transformation segment inserted into delivery URLs for edit-form previews.
pub const THUMBNAIL_TRANSFORM: &str = "/upload/h_300,w_250";

/// Reference to an uploaded image held by the storage provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    /// Delivery URL.
    pub url: String,
    /// Provider-side identifier of the stored object.
    pub filename: String,
}

impl ListingImage {
    /// Preview URL: the first `/upload` segment gains a resize transform.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::ListingImage;
    ///
    /// let image = ListingImage {
    ///     url: "https://res.example.com/demo/image/upload/v1/a.png".to_owned(),
    ///     filename: "wanderlust_DEV/a".to_owned(),
    /// };
    /// assert_eq!(
    ///     image.thumbnail_url(),
    ///     "https://res.example.com/demo/image/upload/h_300,w_250/v1/a.png"
    /// );
    /// ```
    pub fn thumbnail_url(&self) -> String {
        self.url.replacen("/upload", THUMBNAIL_TRANSFORM, 1)
    }
}

/// Validated user-editable listing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFields {
    /// Headline, at most 120 characters.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Nightly price in whole currency units.
    pub price: i64,
    /// Free-text location fed to the geocoder.
    pub location: String,
    /// Country name.
    pub country: String,
}

/// Listing with owner and reviews resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Stable identifier.
    pub id: ListingId,
    /// User-editable fields.
    #[serde(flatten)]
    pub fields: ListingFields,
    /// Geocoded position; absent until geocoding succeeds.
    pub geometry: Option<Geometry>,
    /// Uploaded image, absent for rows created before images were required.
    pub image: Option<ListingImage>,
    /// Creator of the listing.
    pub owner: User,
    /// Reviews in insertion order. Empty on index pages.
    pub reviews: Vec<Review>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Whether `user` created this listing.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner.id == *user
    }

    /// Ordering key used for keyset pagination.
    pub const fn cursor_key(&self) -> ListingCursorKey {
        ListingCursorKey {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Position of a listing in newest-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCursorKey {
    /// Creation time of the last listing already returned.
    pub created_at: DateTime<Utc>,
    /// Identifier breaking ties between equal timestamps.
    pub id: ListingId,
}

/// Listing about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    /// Identifier assigned by the service.
    pub id: ListingId,
    /// Validated fields.
    pub fields: ListingFields,
    /// Geocoded position.
    pub geometry: Option<Geometry>,
    /// Uploaded image.
    pub image: Option<ListingImage>,
    /// Authenticated creator.
    pub owner: UserId,
}

/// Full replacement of the mutable parts of an existing listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingChanges {
    /// Listing to update.
    pub id: ListingId,
    /// Validated fields.
    pub fields: ListingFields,
    /// Geometry after optional re-geocoding.
    pub geometry: Option<Geometry>,
    /// Image after optional replacement.
    pub image: Option<ListingImage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(180.5, 0.0)]
    #[case(0.0, -90.5)]
    #[case(f64::NAN, 0.0)]
    fn rejects_out_of_range_coordinates(#[case] longitude: f64, #[case] latitude: f64) {
        assert!(Coordinates::new(longitude, latitude).is_err());
    }

    #[rstest]
    fn geometry_round_trips_as_geojson() {
        let raw = json!({"type": "Point", "coordinates": [77.209, 28.6139]});
        let geometry: Geometry = serde_json::from_value(raw.clone()).expect("valid geometry");
        assert_eq!(geometry.coordinates().latitude(), 28.6139);
        assert_eq!(serde_json::to_value(geometry).expect("serialise"), raw);
    }

    #[rstest]
    fn geometry_rejects_invalid_coordinates() {
        let raw = json!({"type": "Point", "coordinates": [500.0, 0.0]});
        assert!(serde_json::from_value::<Geometry>(raw).is_err());
    }

    #[rstest]
    #[case(
        "https://res.cloudinary.com/demo/image/upload/v1/wanderlust_DEV/a.png",
        "https://res.cloudinary.com/demo/image/upload/h_300,w_250/v1/wanderlust_DEV/a.png"
    )]
    #[case("https://cdn.example.com/a.png", "https://cdn.example.com/a.png")]
    #[case(
        "https://cdn.example.com/upload/x/upload/a.png",
        "https://cdn.example.com/upload/h_300,w_250/x/upload/a.png"
    )]
    fn thumbnail_rewrites_first_upload_segment(#[case] url: &str, #[case] expected: &str) {
        let image = ListingImage {
            url: url.to_owned(),
            filename: "a".to_owned(),
        };
        assert_eq!(image.thumbnail_url(), expected);
    }

    #[rstest]
    fn parse_rejects_non_uuid_ids() {
        assert!(ListingId::parse("65a1b2c3d4e5f6a7b8c9d0e1").is_none());
    }
}
