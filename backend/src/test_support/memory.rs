//! In-memory user and listing storage.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ListingRepository, ListingRepositoryError, NewUserRecord, StoredCredentials, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Geometry, Listing, ListingChanges, ListingCursorKey, ListingFields, ListingId, ListingImage,
    NewListing, Review, User, UserId, Username,
};

struct ListingRecord {
    id: ListingId,
    fields: ListingFields,
    geometry: Option<Geometry>,
    image: Option<ListingImage>,
    owner: UserId,
    reviews: Vec<Review>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<StoredCredentials>,
    listings: Vec<ListingRecord>,
}

impl State {
    fn user(&self, id: &UserId) -> Option<&User> {
        self.users
            .iter()
            .map(|stored| &stored.user)
            .find(|user| user.id == *id)
    }

    fn resolve(&self, record: &ListingRecord, with_reviews: bool) -> Option<Listing> {
        let owner = self.user(&record.owner)?.clone();
        Some(Listing {
            id: record.id,
            fields: record.fields.clone(),
            geometry: record.geometry,
            image: record.image.clone(),
            owner,
            reviews: if with_reviews {
                record.reviews.clone()
            } else {
                Vec::new()
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Shared in-memory store implementing both repositories.
///
/// Clones share state, so one store can back the account and listing
/// services of a test app while the test inspects it.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory store mutex poisoned"),
        }
    }

    /// Number of stored listings.
    pub fn listing_count(&self) -> usize {
        self.state().listings.len()
    }

    /// Listing with reviews, read straight from the store.
    pub fn listing(&self, id: &ListingId) -> Option<Listing> {
        let state = self.state();
        state
            .listings
            .iter()
            .find(|record| record.id == *id)
            .and_then(|record| state.resolve(record, true))
    }

    /// Attach `review` to a stored listing. Returns `false` when the listing
    /// does not exist.
    pub fn add_review(&self, listing: &ListingId, review: Review) -> bool {
        let mut state = self.state();
        match state.listings.iter_mut().find(|record| record.id == *listing) {
            Some(record) => {
                record.reviews.push(review);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut state = self.state();
        if state
            .users
            .iter()
            .any(|stored| stored.user.username == record.username)
        {
            return Err(UserRepositoryError::duplicate_username(
                record.username.as_str(),
            ));
        }
        let user = User {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
        };
        state.users.push(StoredCredentials {
            user: user.clone(),
            password_hash: record.password_hash.clone(),
        });
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|stored| stored.user.username == *username)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.state().user(id).cloned())
    }
}

fn newest_first(record: &ListingRecord) -> Reverse<(DateTime<Utc>, uuid::Uuid)> {
    Reverse((record.created_at, *record.id.as_uuid()))
}

fn is_after(record: &ListingRecord, cursor: &ListingCursorKey) -> bool {
    (record.created_at, *record.id.as_uuid()) < (cursor.created_at, *cursor.id.as_uuid())
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn list(
        &self,
        after: Option<ListingCursorKey>,
        limit: usize,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let state = self.state();
        let mut records: Vec<&ListingRecord> = state
            .listings
            .iter()
            .filter(|record| after.as_ref().is_none_or(|cursor| is_after(record, cursor)))
            .collect();
        records.sort_by_key(|record| newest_first(record));
        Ok(records
            .into_iter()
            .take(limit)
            .filter_map(|record| state.resolve(record, false))
            .collect())
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(self.listing(id))
    }

    async fn create(&self, listing: &NewListing) -> Result<Listing, ListingRepositoryError> {
        let mut state = self.state();
        if state.user(&listing.owner).is_none() {
            return Err(ListingRepositoryError::query("owner does not exist"));
        }
        let now = Utc::now();
        let record = ListingRecord {
            id: listing.id,
            fields: listing.fields.clone(),
            geometry: listing.geometry,
            image: listing.image.clone(),
            owner: listing.owner,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let stored = state
            .resolve(&record, true)
            .ok_or_else(|| ListingRepositoryError::query("owner does not exist"))?;
        state.listings.push(record);
        Ok(stored)
    }

    async fn update(&self, changes: &ListingChanges) -> Result<bool, ListingRepositoryError> {
        let mut state = self.state();
        let Some(record) = state
            .listings
            .iter_mut()
            .find(|record| record.id == changes.id)
        else {
            return Ok(false);
        };
        record.fields = changes.fields.clone();
        record.geometry = changes.geometry;
        record.image = changes.image.clone();
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        let mut state = self.state();
        let before = state.listings.len();
        state.listings.retain(|record| record.id != *id);
        Ok(state.listings.len() != before)
    }
}
