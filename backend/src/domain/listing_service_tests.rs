//! Behaviour coverage for the listing service.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    GeocoderError, ImageStoreError, MockGeocoder, MockImageStore, MockListingRepository,
};
use crate::domain::{
    Coordinates, Email, ErrorCode, ListingFields, ListingPayload, Sleeper, User, UserId, Username,
};

struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

fn user(name: &str) -> User {
    User {
        id: UserId::random(),
        username: Username::new(name).expect("valid username"),
        email: Email::new(format!("{name}@example.com")).expect("valid email"),
    }
}

#[fixture]
fn owner() -> User {
    user("host_ada")
}

#[fixture]
fn payload() -> ListingPayload {
    ListingPayload {
        title: Some("Cozy Beachfront Cottage".to_owned()),
        description: Some("Wake up to the sound of waves.".to_owned()),
        price: Some("1500".to_owned()),
        location: Some("Malibu".to_owned()),
        country: Some("United States".to_owned()),
    }
}

fn upload() -> ImageUpload {
    ImageUpload {
        filename: "cottage.png".to_owned(),
        content_type: "image/png".to_owned(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

fn malibu() -> Geometry {
    Geometry::point(Coordinates::new(-118.7798, 34.0259).expect("in range"))
}

fn stored_image() -> ListingImage {
    ListingImage {
        url: "https://res.example.com/demo/image/upload/v1/wanderlust_DEV/abc.png".to_owned(),
        filename: "wanderlust_DEV/abc".to_owned(),
    }
}

fn stored_listing(owner: &User) -> Listing {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("timestamp");
    Listing {
        id: ListingId::random(),
        fields: ListingFields {
            title: "Cozy Beachfront Cottage".to_owned(),
            description: "Wake up to the sound of waves.".to_owned(),
            price: 1500,
            location: "Malibu".to_owned(),
            country: "United States".to_owned(),
        },
        geometry: Some(malibu()),
        image: Some(stored_image()),
        owner: owner.clone(),
        reviews: Vec::new(),
        created_at: created,
        updated_at: created,
    }
}

fn materialise(new: &NewListing, owner: &User) -> Listing {
    let now = Utc::now();
    Listing {
        id: new.id,
        fields: new.fields.clone(),
        geometry: new.geometry,
        image: new.image.clone(),
        owner: owner.clone(),
        reviews: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn service(
    repository: MockListingRepository,
    geocoder: MockGeocoder,
    images: MockImageStore,
) -> ListingService {
    ListingService::new(
        ListingServicePorts {
            repository: Arc::new(repository),
            geocoder: Arc::new(geocoder),
            images: Arc::new(images),
        },
        RetryPolicy::default().with_sleeper(Arc::new(NoopSleeper)),
    )
}

fn uploading_store() -> MockImageStore {
    let mut images = MockImageStore::new();
    images
        .expect_upload()
        .times(1)
        .returning(|_| Ok(stored_image()));
    images
}

fn untouched_store() -> MockImageStore {
    let mut images = MockImageStore::new();
    images.expect_upload().times(0);
    images
}

fn untouched_geocoder() -> MockGeocoder {
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_forward_geocode().times(0);
    geocoder
}

#[rstest]
#[tokio::test]
async fn create_persists_listing_owned_by_requester(owner: User, payload: ListingPayload) {
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .withf(|query| query == "Malibu")
        .times(1)
        .returning(|_| Ok(Some(malibu())));

    let mut repository = MockListingRepository::new();
    let owner_id = owner.id;
    let stored_owner = owner.clone();
    repository
        .expect_create()
        .withf(move |new| {
            new.owner == owner_id
                && new.geometry == Some(malibu())
                && new.image == Some(stored_image())
        })
        .times(1)
        .returning(move |new| Ok(materialise(new, &stored_owner)));

    let listing = service(repository, geocoder, uploading_store())
        .create(CreateListingRequest {
            owner: owner.id,
            payload,
            image: Some(upload()),
        })
        .await
        .expect("listing created");

    assert_eq!(listing.owner, owner);
    assert_eq!(listing.geometry, Some(malibu()));
}

#[rstest]
#[tokio::test]
async fn invalid_payload_has_no_side_effects(owner: User, mut payload: ListingPayload) {
    payload.title = None;
    let mut repository = MockListingRepository::new();
    repository.expect_create().times(0);

    let error = service(repository, untouched_geocoder(), untouched_store())
        .create(CreateListingRequest {
            owner: owner.id,
            payload,
            image: Some(upload()),
        })
        .await
        .expect_err("validation fails");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "\"title\" is required");
}

#[rstest]
#[tokio::test]
async fn missing_image_is_reported_with_other_failures(owner: User, mut payload: ListingPayload) {
    payload.price = Some("-3".to_owned());
    let error = service(
        MockListingRepository::new(),
        untouched_geocoder(),
        untouched_store(),
    )
    .create(CreateListingRequest {
        owner: owner.id,
        payload,
        image: None,
    })
    .await
    .expect_err("validation fails");

    assert_eq!(
        error.message(),
        "\"price\" must be greater than or equal to 0,\"image\" is required"
    );
}

#[rstest]
#[tokio::test]
async fn unmatched_location_is_a_client_error(owner: User, payload: ListingPayload) {
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .times(1)
        .returning(|_| Ok(None));
    let mut repository = MockListingRepository::new();
    repository.expect_create().times(0);

    let error = service(repository, geocoder, untouched_store())
        .create(CreateListingRequest {
            owner: owner.id,
            payload,
            image: Some(upload()),
        })
        .await
        .expect_err("no match");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "Could not find a location matching \"Malibu\"");
}

#[rstest]
#[tokio::test]
async fn transient_geocoder_failure_is_retried(owner: User, payload: ListingPayload) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_forward_geocode().times(2).returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(GeocoderError::timeout("deadline elapsed"))
        } else {
            Ok(Some(malibu()))
        }
    });
    let mut repository = MockListingRepository::new();
    let stored_owner = owner.clone();
    repository
        .expect_create()
        .times(1)
        .returning(move |new| Ok(materialise(new, &stored_owner)));

    let listing = service(repository, geocoder, uploading_store())
        .create(CreateListingRequest {
            owner: owner.id,
            payload,
            image: Some(upload()),
        })
        .await
        .expect("created after retry");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(listing.geometry, Some(malibu()));
}

#[rstest]
#[tokio::test]
async fn rejected_upload_is_not_retried(owner: User, payload: ListingPayload) {
    let mut images = MockImageStore::new();
    images
        .expect_upload()
        .times(1)
        .returning(|_| Err(ImageStoreError::rejected("invalid signature")));
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .times(1)
        .returning(|_| Ok(Some(malibu())));
    let mut repository = MockListingRepository::new();
    repository.expect_create().times(0);

    let error = service(repository, geocoder, images)
        .create(CreateListingRequest {
            owner: owner.id,
            payload,
            image: Some(upload()),
        })
        .await
        .expect_err("upload rejected");

    assert_eq!(error.code(), ErrorCode::ExternalServiceFailure);
}

#[rstest]
#[tokio::test]
async fn exhausted_geocoder_never_uploads(owner: User, payload: ListingPayload) {
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .times(3)
        .returning(|_| Err(GeocoderError::transport("connection reset")));
    let mut repository = MockListingRepository::new();
    repository.expect_create().times(0);

    let error = service(repository, geocoder, untouched_store())
        .create(CreateListingRequest {
            owner: owner.id,
            payload,
            image: Some(upload()),
        })
        .await
        .expect_err("geocoder unavailable");

    assert_eq!(error.code(), ErrorCode::ExternalServiceFailure);
}

#[rstest]
#[tokio::test]
async fn update_to_unknown_location_keeps_new_image_local(
    owner: User,
    mut payload: ListingPayload,
) {
    payload.location = Some("Atlantis".to_owned());
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .withf(|query| query == "Atlantis")
        .times(1)
        .returning(|_| Ok(None));
    let mut repository = MockListingRepository::new();
    repository.expect_update().times(0);

    let error = service(repository, geocoder, untouched_store())
        .update(UpdateListingRequest {
            actor: owner.id,
            current: stored_listing(&owner),
            payload,
            image: Some(upload()),
        })
        .await
        .expect_err("no match");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn non_owner_cannot_update(owner: User, payload: ListingPayload) {
    let mut repository = MockListingRepository::new();
    repository.expect_update().times(0);

    let error = service(repository, untouched_geocoder(), untouched_store())
        .update(UpdateListingRequest {
            actor: user("intruder").id,
            current: stored_listing(&owner),
            payload,
            image: None,
        })
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "You are not the owner of this listing");
}

#[rstest]
#[tokio::test]
async fn update_without_image_keeps_image_and_geometry(owner: User, mut payload: ListingPayload) {
    payload.price = Some("1750".to_owned());
    let current = stored_listing(&owner);
    let listing_id = current.id;

    let mut repository = MockListingRepository::new();
    repository
        .expect_update()
        .withf(move |changes| {
            changes.id == listing_id
                && changes.fields.price == 1750
                && changes.image == Some(stored_image())
                && changes.geometry == Some(malibu())
        })
        .times(1)
        .returning(|_| Ok(true));

    service(repository, untouched_geocoder(), untouched_store())
        .update(UpdateListingRequest {
            actor: owner.id,
            current,
            payload,
            image: None,
        })
        .await
        .expect("updated");
}

#[rstest]
#[tokio::test]
async fn update_with_new_image_and_location_replaces_both(
    owner: User,
    mut payload: ListingPayload,
) {
    payload.location = Some("Lisbon".to_owned());
    let lisbon = Geometry::point(Coordinates::new(-9.1393, 38.7223).expect("in range"));
    let replacement = ListingImage {
        url: "https://res.example.com/demo/image/upload/v2/wanderlust_DEV/new.jpg".to_owned(),
        filename: "wanderlust_DEV/new".to_owned(),
    };

    let mut images = MockImageStore::new();
    let uploaded = replacement.clone();
    images
        .expect_upload()
        .times(1)
        .returning(move |_| Ok(uploaded.clone()));
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .withf(|query| query == "Lisbon")
        .times(1)
        .returning(move |_| Ok(Some(lisbon)));
    let mut repository = MockListingRepository::new();
    repository
        .expect_update()
        .withf(move |changes| {
            changes.image.as_ref() == Some(&replacement) && changes.geometry == Some(lisbon)
        })
        .times(1)
        .returning(|_| Ok(true));

    service(repository, geocoder, images)
        .update(UpdateListingRequest {
            actor: owner.id,
            current: stored_listing(&owner),
            payload,
            image: Some(upload()),
        })
        .await
        .expect("updated");
}

#[rstest]
#[tokio::test]
async fn delete_of_vanished_listing_is_not_found(owner: User) {
    let mut repository = MockListingRepository::new();
    repository.expect_delete().times(1).returning(|_| Ok(false));

    let error = service(repository, untouched_geocoder(), untouched_store())
        .delete(DeleteListingRequest {
            actor: owner.id,
            current: stored_listing(&owner),
        })
        .await
        .expect_err("already gone");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn non_owner_cannot_delete(owner: User) {
    let mut repository = MockListingRepository::new();
    repository.expect_delete().times(0);

    let error = service(repository, untouched_geocoder(), untouched_store())
        .delete(DeleteListingRequest {
            actor: user("intruder").id,
            current: stored_listing(&owner),
        })
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn list_returns_cursor_when_more_rows_exist(owner: User) {
    let rows: Vec<_> = (0..3).map(|_| stored_listing(&owner)).collect();
    let expected_last = rows[1].cursor_key();
    let mut repository = MockListingRepository::new();
    repository
        .expect_list()
        .withf(|after, limit| after.is_none() && *limit == 3)
        .times(1)
        .returning(move |_, _| Ok(rows.clone()));

    let request = PageRequest::new(None, Some(2)).expect("valid request");
    let page = service(repository, untouched_geocoder(), untouched_store())
        .list(&request)
        .await
        .expect("page");

    assert_eq!(page.items.len(), 2);
    let token = page.next_cursor.expect("next cursor");
    let decoded = Cursor::<ListingCursorKey>::decode(&token).expect("decodable cursor");
    assert_eq!(decoded.into_key(), expected_last);
}

#[rstest]
#[tokio::test]
async fn list_rejects_garbage_cursor() {
    let mut repository = MockListingRepository::new();
    repository.expect_list().times(0);

    let request = PageRequest::new(Some("%%%".to_owned()), None).expect("valid request");
    let error = service(repository, untouched_geocoder(), untouched_store())
        .list(&request)
        .await
        .expect_err("bad cursor");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn unreachable_database_maps_to_service_unavailable() {
    let mut repository = MockListingRepository::new();
    repository
        .expect_find_by_id()
        .returning(|_| Err(ListingRepositoryError::connection("pool timed out")));

    let error = service(repository, untouched_geocoder(), untouched_store())
        .find(&ListingId::random())
        .await
        .expect_err("db down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
