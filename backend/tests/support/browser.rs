//! Cookie-carrying client over the full page stack.
//!
//! Mounts the same route table and middleware as the server, backed by
//! in-memory adapters, and replays the session cookie between requests the
//! way a browser would.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::{App, test, web};
use wanderlust::domain::ports::{Geocoder, ImageStore};
use wanderlust::domain::{
    Coordinates, Geometry, ListingService, ListingServicePorts, RetryPolicy, UserAccountService,
};
use wanderlust::inbound::http::health::{HealthState, live, ready};
use wanderlust::inbound::http::session_config::{
    SESSION_COOKIE_NAME, SessionSettings, session_middleware,
};
use wanderlust::inbound::http::state::HttpState;
use wanderlust::test_support::{
    InMemoryStore, MultipartBody, PlainPasswordHasher, RecordingImageStore, ScriptedGeocoder,
};
use wanderlust::{MethodOverride, Trace};

/// Token rendered into listing pages.
pub const MAP_TOKEN: &str = "pk.integration";

/// Point every unscripted geocode resolves to.
pub fn delhi() -> Geometry {
    Geometry::point(Coordinates::new(77.2088, 28.6139).expect("in range"))
}

/// Adapters behind one browser session.
pub struct Backends {
    pub store: InMemoryStore,
    pub geocoder: Arc<ScriptedGeocoder>,
    pub images: Arc<RecordingImageStore>,
}

impl Backends {
    pub fn new(geocoder: ScriptedGeocoder) -> Self {
        Self {
            store: InMemoryStore::new(),
            geocoder: Arc::new(geocoder),
            images: Arc::new(RecordingImageStore::default()),
        }
    }

    fn http_state(&self) -> HttpState {
        let listings = Arc::new(ListingService::new(
            ListingServicePorts {
                repository: Arc::new(self.store.clone()),
                geocoder: self.geocoder.clone() as Arc<dyn Geocoder>,
                images: self.images.clone() as Arc<dyn ImageStore>,
            },
            RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5)),
        ));
        let accounts = Arc::new(UserAccountService::new(
            Arc::new(self.store.clone()),
            Arc::new(PlainPasswordHasher),
        ));
        HttpState::new(listings.clone(), listings, accounts)
            .with_map_token(MAP_TOKEN)
            .with_upload_max_bytes(1024)
    }
}

impl Default for Backends {
    fn default() -> Self {
        Self::new(ScriptedGeocoder::new(Some(delhi())))
    }
}

/// Response captured as plain values.
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Page {
    /// Redirect target, asserting the response is a 302.
    pub fn redirect_target(&self) -> &str {
        assert_eq!(self.status, StatusCode::FOUND, "expected redirect: {}", self.body);
        self.location.as_deref().expect("location header")
    }
}

/// Build the page stack over `backends`.
pub async fn app(
    backends: &Backends,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    test::init_service(
        App::new()
            .app_data(web::Data::new(HealthState::new()))
            .app_data(web::Data::new(backends.http_state()))
            .service(ready)
            .service(live)
            .configure(wanderlust::inbound::http::configure)
            .wrap(session_middleware(&session))
            .wrap(MethodOverride)
            .wrap(Trace),
    )
    .await
}

/// One browser: a service plus the latest session cookie.
pub struct Browser<S> {
    service: S,
    cookie: Option<Cookie<'static>>,
}

impl<S> Browser<S>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    pub const fn new(service: S) -> Self {
        Self {
            service,
            cookie: None,
        }
    }

    /// Forget the session cookie.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn send(&mut self, request: test::TestRequest) -> Page {
        let request = match &self.cookie {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        };
        let response = test::call_service(&self.service, request.to_request()).await;
        if let Some(cookie) = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        {
            self.cookie = Some(cookie.into_owned());
        }
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = test::read_body(response).await;
        Page {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
        }
    }

    pub async fn get(&mut self, uri: &str) -> Page {
        self.send(test::TestRequest::get().uri(uri)).await
    }

    /// GET `uri` and follow any redirect once.
    pub async fn follow(&mut self, uri: &str) -> Page {
        let page = self.get(uri).await;
        match page.location.clone() {
            Some(target) if page.status == StatusCode::FOUND => self.get(&target).await,
            _ => page,
        }
    }

    pub async fn post_form(&mut self, uri: &str, form: &[(&str, &str)]) -> Page {
        self.send(test::TestRequest::post().uri(uri).set_form(form))
            .await
    }

    pub async fn post_multipart(&mut self, uri: &str, body: MultipartBody) -> Page {
        let (content_type, payload) = body.finish();
        self.send(
            test::TestRequest::post()
                .uri(uri)
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(payload),
        )
        .await
    }

    pub async fn signup(&mut self, username: &str) -> Page {
        self.post_form(
            "/signup",
            &[
                ("username", username),
                ("email", &format!("{username}@example.com")),
                ("password", "correct horse battery"),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Page {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }
}

/// Complete listing form for `title`, with an image.
pub fn listing_form(title: &str, location: &str) -> MultipartBody {
    listing_fields(title, location).file("listing[image]", "villa.png", "image/png", b"png-bytes")
}

/// Complete listing form without an image.
pub fn listing_fields(title: &str, location: &str) -> MultipartBody {
    MultipartBody::new()
        .text("listing[title]", title)
        .text("listing[description]", "Sea views and a quiet garden.")
        .text("listing[price]", "2500")
        .text("listing[location]", location)
        .text("listing[country]", "India")
}

/// Listing ids linked from an index page, in page order.
pub fn listing_ids(body: &str) -> Vec<String> {
    body.match_indices("href=\"/listings/")
        .filter_map(|(start, prefix)| body.get(start + prefix.len()..start + prefix.len() + 36))
        .filter(|candidate| uuid::Uuid::parse_str(candidate).is_ok())
        .map(str::to_owned)
        .collect()
}
