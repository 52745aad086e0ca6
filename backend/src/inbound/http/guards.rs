//! Request guards for listing routes.
//!
//! Guards are extractors. A failed guard queues a flash notice and answers
//! with a redirect instead of an error page, so handlers only run for
//! requests that passed.

use actix_web::error::InternalError;
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{Error, LISTING_MISSING_MESSAGE, Listing, ListingId, NOT_OWNER_MESSAGE};

use super::flash::FlashKind;
use super::session::{SessionContext, SessionUser};
use super::state::HttpState;

/// Notice shown when a guarded page needs a login.
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to create listing!";

/// `302 Found` to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location.to_owned()))
        .finish()
}

/// [`redirect`] raised as an extractor error.
pub(crate) fn redirect_error(location: &str) -> actix_web::Error {
    InternalError::from_response("redirect", redirect(location)).into()
}

/// Authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct LoggedInUser(pub SessionUser);

fn logged_in_user(req: &HttpRequest) -> Result<LoggedInUser, actix_web::Error> {
    let session = SessionContext::from_http_request(req);
    if let Some(user) = session.current_user()? {
        return Ok(LoggedInUser(user));
    }

    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
    debug!(%target, "login required");
    session.set_return_to(&target)?;
    session.flash(FlashKind::Error, LOGIN_REQUIRED_MESSAGE)?;
    Err(redirect_error("/login"))
}

impl FromRequest for LoggedInUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(logged_in_user(req))
    }
}

/// Listing from the `{id}` path segment, owned by the logged-in user.
///
/// Carries the fetched listing so handlers do not look it up again.
#[derive(Debug, Clone)]
pub struct OwnedListing {
    /// The owner.
    pub user: SessionUser,
    /// The listing as currently stored.
    pub listing: Listing,
}

async fn owned_listing(req: HttpRequest) -> Result<OwnedListing, actix_web::Error> {
    let LoggedInUser(user) = logged_in_user(&req)?;
    let session = SessionContext::from_http_request(&req);
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;

    let id = req.match_info().get("id").and_then(ListingId::parse);
    let listing = match id {
        Some(id) => state.listings_query.find(&id).await?,
        None => None,
    };
    let Some(listing) = listing else {
        session.flash(FlashKind::Error, LISTING_MISSING_MESSAGE)?;
        return Err(redirect_error("/listings"));
    };

    if !listing.is_owned_by(&user.id) {
        debug!(listing_id = %listing.id, user_id = %user.id, "ownership check failed");
        session.flash(FlashKind::Error, NOT_OWNER_MESSAGE)?;
        return Err(redirect_error(&format!("/listings/{}", listing.id)));
    }
    Ok(OwnedListing { user, listing })
}

impl FromRequest for OwnedListing {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(owned_listing(req.clone()))
    }
}
