//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! stored values and report corrupt rows as plain messages.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Coordinates, Email, Geometry, Listing, ListingFields, ListingId, ListingImage, Rating, Review,
    ReviewId, User, UserId, Username,
};

use super::schema::{listings, reviews, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// User row together with the stored password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let username = Username::new(self.username)
            .map_err(|error| format!("user {} has an invalid username: {error}", self.id))?;
        let email = Email::new(self.email)
            .map_err(|error| format!("user {} has an invalid email: {error}", self.id))?;
        Ok(User {
            id: UserId::from(self.id),
            username,
            email,
        })
    }
}

/// Row struct for reading from the listings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub location: String,
    pub country: String,
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRow {
    pub(crate) fn into_domain(self, owner: User, reviews: Vec<Review>) -> Result<Listing, String> {
        let geometry = match (self.longitude, self.latitude) {
            (Some(longitude), Some(latitude)) => Some(Geometry::point(
                Coordinates::new(longitude, latitude).map_err(|error| {
                    format!("listing {} has invalid coordinates: {error}", self.id)
                })?,
            )),
            _ => None,
        };
        let image = match (self.image_url, self.image_filename) {
            (Some(url), Some(filename)) => Some(ListingImage { url, filename }),
            _ => None,
        };
        Ok(Listing {
            id: ListingId::from(self.id),
            fields: ListingFields {
                title: self.title,
                description: self.description,
                price: self.price,
                location: self.location,
                country: self.country,
            },
            geometry,
            image,
            owner,
            reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for new listings; timestamps come from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub(crate) struct NewListingRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: i64,
    pub location: &'a str,
    pub country: &'a str,
    pub image_url: Option<&'a str>,
    pub image_filename: Option<&'a str>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub owner_id: Uuid,
}

/// Changeset overwriting every mutable listing column.
///
/// `treat_none_as_null` so a cleared image or point is written as `NULL`
/// rather than skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = listings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ListingUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: i64,
    pub location: &'a str,
    pub country: &'a str,
    pub image_url: Option<&'a str>,
    pub image_filename: Option<&'a str>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub comment: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    pub(crate) fn into_domain(self, author: User) -> Result<Review, String> {
        let rating = Rating::new(self.rating)
            .map_err(|error| format!("review {} is invalid: {error}", self.id))?;
        Ok(Review {
            id: ReviewId::from(self.id),
            comment: self.comment,
            rating,
            author,
            created_at: self.created_at,
        })
    }
}
