//! PostgreSQL-backed `ListingRepository` implementation using Diesel ORM.
//!
//! Listings are read joined with their owner. Reviews are loaded only for
//! single-listing reads, through the ordered `listing_reviews` link table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{
    Geometry, Listing, ListingChanges, ListingCursorKey, ListingId, NewListing, Review,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ListingRow, ListingUpdate, NewListingRow, ReviewRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{listing_reviews, listings, reviews, users};

/// Diesel-backed implementation of the `ListingRepository` port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ListingRepositoryError {
    map_pool_error(error, ListingRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ListingRepositoryError {
    map_diesel_error(
        error,
        ListingRepositoryError::query,
        ListingRepositoryError::connection,
    )
}

fn assemble(
    listing: ListingRow,
    owner: UserRow,
    reviews: Vec<Review>,
) -> Result<Listing, ListingRepositoryError> {
    let owner = owner.into_domain().map_err(ListingRepositoryError::query)?;
    listing
        .into_domain(owner, reviews)
        .map_err(ListingRepositoryError::query)
}

async fn load_reviews(
    conn: &mut AsyncPgConnection,
    listing_id: Uuid,
) -> Result<Vec<Review>, ListingRepositoryError> {
    let rows: Vec<(ReviewRow, UserRow)> = listing_reviews::table
        .inner_join(reviews::table.inner_join(users::table))
        .filter(listing_reviews::listing_id.eq(listing_id))
        .order(listing_reviews::position.asc())
        .select((ReviewRow::as_select(), UserRow::as_select()))
        .load(conn)
        .await
        .map_err(diesel_error)?;

    rows.into_iter()
        .map(|(review, author)| {
            let author = author.into_domain().map_err(ListingRepositoryError::query)?;
            review
                .into_domain(author)
                .map_err(ListingRepositoryError::query)
        })
        .collect()
}

async fn load_with_owner(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<(ListingRow, UserRow)>, ListingRepositoryError> {
    listings::table
        .inner_join(users::table)
        .filter(listings::id.eq(id))
        .select((ListingRow::as_select(), UserRow::as_select()))
        .first(conn)
        .await
        .optional()
        .map_err(diesel_error)
}

fn point_columns(geometry: Option<&Geometry>) -> (Option<f64>, Option<f64>) {
    geometry.map_or((None, None), |geometry| {
        let point = geometry.coordinates();
        (Some(point.longitude()), Some(point.latitude()))
    })
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn list(
        &self,
        after: Option<ListingCursorKey>,
        limit: usize,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut query = listings::table
            .inner_join(users::table)
            .select((ListingRow::as_select(), UserRow::as_select()))
            .order((listings::created_at.desc(), listings::id.desc()))
            .limit(limit)
            .into_boxed();
        if let Some(after) = after {
            let id = *after.id.as_uuid();
            query = query.filter(
                listings::created_at.lt(after.created_at).or(listings::created_at
                    .eq(after.created_at)
                    .and(listings::id.lt(id))),
            );
        }

        let rows: Vec<(ListingRow, UserRow)> =
            query.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter()
            .map(|(listing, owner)| assemble(listing, owner, Vec::new()))
            .collect()
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let Some((listing, owner)) = load_with_owner(&mut conn, *id.as_uuid()).await? else {
            return Ok(None);
        };
        let reviews = load_reviews(&mut conn, listing.id).await?;
        assemble(listing, owner, reviews).map(Some)
    }

    async fn create(&self, listing: &NewListing) -> Result<Listing, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (longitude, latitude) = point_columns(listing.geometry.as_ref());
        let row = NewListingRow {
            id: *listing.id.as_uuid(),
            title: &listing.fields.title,
            description: &listing.fields.description,
            price: listing.fields.price,
            location: &listing.fields.location,
            country: &listing.fields.country,
            image_url: listing.image.as_ref().map(|image| image.url.as_str()),
            image_filename: listing.image.as_ref().map(|image| image.filename.as_str()),
            longitude,
            latitude,
            owner_id: *listing.owner.as_uuid(),
        };

        diesel::insert_into(listings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;

        let (stored, owner) = load_with_owner(&mut conn, row.id)
            .await?
            .ok_or_else(|| {
                ListingRepositoryError::query("inserted listing could not be read back")
            })?;
        assemble(stored, owner, Vec::new())
    }

    async fn update(&self, changes: &ListingChanges) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (longitude, latitude) = point_columns(changes.geometry.as_ref());
        let update = ListingUpdate {
            title: &changes.fields.title,
            description: &changes.fields.description,
            price: changes.fields.price,
            location: &changes.fields.location,
            country: &changes.fields.country,
            image_url: changes.image.as_ref().map(|image| image.url.as_str()),
            image_filename: changes.image.as_ref().map(|image| image.filename.as_str()),
            longitude,
            latitude,
        };

        let affected = diesel::update(listings::table.find(*changes.id.as_uuid()))
            .set((&update, listings::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(listings::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }
}
