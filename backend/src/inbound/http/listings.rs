//! Listing pages and form handlers.
//!
//! ```text
//! GET    /listings            index, newest first, ?cursor=&limit=
//! GET    /listings/new        creation form (logged in)
//! POST   /listings            create (logged in, multipart)
//! GET    /listings/{id}       show
//! GET    /listings/{id}/edit  edit form (owner)
//! PUT    /listings/{id}       update (owner, multipart)
//! DELETE /listings/{id}       delete (owner)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use minijinja::context;
use pagination::{PageLinks, PageRequest};
use serde::Deserialize;

use crate::domain::ports::{CreateListingRequest, DeleteListingRequest, UpdateListingRequest};
use crate::domain::{Error, LISTING_MISSING_MESSAGE, ListingId, ListingImage};

use super::ApiResult;
use super::flash::FlashKind;
use super::guards::{LoggedInUser, OwnedListing, redirect};
use super::listing_form::read_listing_form;
use super::session::SessionContext;
use super::state::HttpState;
use super::views::render_page;

/// Notice after a successful create.
pub const LISTING_CREATED_MESSAGE: &str = "New Listing Created!";
/// Notice after a successful update.
pub const LISTING_UPDATED_MESSAGE: &str = "Listing Updated!";
/// Notice after a successful delete.
pub const LISTING_DELETED_MESSAGE: &str = "Listing Deleted!";

/// Index query string.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
    /// Page size.
    pub limit: Option<usize>,
}

/// Register the listing routes. `/listings/new` precedes `/listings/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/listings")
            .route(web::get().to(index))
            .route(web::post().to(create)),
    )
    .service(web::resource("/listings/new").route(web::get().to(new_form)))
    .service(
        web::resource("/listings/{id}")
            .route(web::get().to(show))
            .route(web::put().to(update))
            .route(web::patch().to(update))
            .route(web::delete().to(delete)),
    )
    .service(web::resource("/listings/{id}/edit").route(web::get().to(edit_form)));
}

async fn index(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<IndexQuery>,
) -> ApiResult<HttpResponse> {
    let IndexQuery { cursor, limit } = query.into_inner();
    let request =
        PageRequest::new(cursor, limit).map_err(|err| Error::invalid_request(err.to_string()))?;
    let page = state.listings_query.list(&request).await?;
    let links = PageLinks::new(&req.full_url(), &request, page.next_cursor.as_deref());

    render_page(
        &session,
        "listings/index.html",
        context! {
            listings => page.items,
            next_page => links.next,
        },
    )
}

async fn new_form(_user: LoggedInUser, session: SessionContext) -> ApiResult<HttpResponse> {
    render_page(&session, "listings/new.html", context! {})
}

async fn show(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let listing = match ListingId::parse(&path) {
        Some(id) => state.listings_query.find(&id).await?,
        None => None,
    };
    let Some(listing) = listing else {
        session.flash(FlashKind::Error, LISTING_MISSING_MESSAGE)?;
        return Ok(redirect("/listings"));
    };

    let is_owner = session
        .current_user()?
        .is_some_and(|user| listing.is_owned_by(&user.id));
    let coordinates = listing.geometry.map(|geometry| geometry.coordinates());
    render_page(
        &session,
        "listings/show.html",
        context! {
            listing => listing,
            is_owner => is_owner,
            coordinates => coordinates,
            map_token => state.map_token.as_str(),
        },
    )
}

async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    LoggedInUser(user): LoggedInUser,
    multipart: Multipart,
) -> ApiResult<HttpResponse> {
    let form = read_listing_form(multipart, state.upload_max_bytes).await?;
    state
        .listings
        .create(CreateListingRequest {
            owner: user.id,
            payload: form.payload,
            image: form.image,
        })
        .await?;

    session.flash(FlashKind::Success, LISTING_CREATED_MESSAGE)?;
    Ok(redirect("/listings"))
}

async fn edit_form(owned: OwnedListing, session: SessionContext) -> ApiResult<HttpResponse> {
    let OwnedListing { listing, .. } = owned;
    let thumbnail_url = listing.image.as_ref().map(ListingImage::thumbnail_url);
    render_page(
        &session,
        "listings/edit.html",
        context! {
            listing => listing,
            thumbnail_url => thumbnail_url,
        },
    )
}

async fn update(
    state: web::Data<HttpState>,
    session: SessionContext,
    owned: OwnedListing,
    multipart: Multipart,
) -> ApiResult<HttpResponse> {
    let OwnedListing { user, listing } = owned;
    let id = listing.id;
    let form = read_listing_form(multipart, state.upload_max_bytes).await?;
    state
        .listings
        .update(UpdateListingRequest {
            actor: user.id,
            current: listing,
            payload: form.payload,
            image: form.image,
        })
        .await?;

    session.flash(FlashKind::Success, LISTING_UPDATED_MESSAGE)?;
    Ok(redirect(&format!("/listings/{id}")))
}

async fn delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    owned: OwnedListing,
) -> ApiResult<HttpResponse> {
    let OwnedListing { user, listing } = owned;
    state
        .listings
        .delete(DeleteListingRequest {
            actor: user.id,
            current: listing,
        })
        .await?;

    session.flash(FlashKind::Success, LISTING_DELETED_MESSAGE)?;
    Ok(redirect("/listings"))
}
