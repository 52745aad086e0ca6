//! Builders wiring outbound adapters into the HTTP state.

use std::io;
use std::sync::Arc;

use mockable::DefaultClock;
use zeroize::Zeroizing;

use wanderlust::domain::ports::{Geocoder, ImageStore, ListingCommand, ListingQuery};
use wanderlust::domain::{ListingService, ListingServicePorts, UserAccountService};
use wanderlust::inbound::http::state::HttpState;
use wanderlust::outbound::cloudinary::{CloudinaryCredentials, CloudinaryImageStore};
use wanderlust::outbound::mapbox::MapboxGeocoder;
use wanderlust::outbound::password::Argon2PasswordHasher;
use wanderlust::outbound::persistence::{DbPool, DieselListingRepository, DieselUserRepository};
use wanderlust::settings::AppSettings;

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{context}: {error}"))
}

fn build_geocoder(settings: &AppSettings) -> io::Result<Arc<dyn Geocoder>> {
    let base_url = settings
        .mapbox_base_url()
        .map_err(|err| startup_error("geocoder settings", err))?;
    let token = settings
        .map_token()
        .map_err(|err| startup_error("geocoder settings", err))?;
    let geocoder = MapboxGeocoder::new(base_url, token, settings.geocoder_timeout())
        .map_err(|err| startup_error("geocoder client", err))?;
    Ok(Arc::new(geocoder))
}

fn build_image_store(settings: &AppSettings) -> io::Result<Arc<dyn ImageStore>> {
    let settings_error = |err| startup_error("image store settings", err);
    let credentials = CloudinaryCredentials {
        cloud_name: settings.cloudinary_cloud_name().map_err(settings_error)?.to_owned(),
        api_key: settings.cloudinary_key().map_err(settings_error)?.to_owned(),
        api_secret: Zeroizing::new(
            settings
                .cloudinary_secret()
                .map_err(settings_error)?
                .to_owned(),
        ),
    };
    let store = CloudinaryImageStore::new(
        settings.cloudinary_base_url().map_err(settings_error)?,
        credentials,
        settings.cloudinary_folder(),
        settings.storage_timeout(),
        Arc::new(DefaultClock),
    )
    .map_err(|err| startup_error("image store client", err))?;
    Ok(Arc::new(store))
}

/// Build the HTTP state from settings and a live database pool.
///
/// # Errors
///
/// Returns [`io::Error`] when a provider setting is missing or a provider
/// client cannot be constructed.
pub fn build_http_state(settings: &AppSettings, pool: &DbPool) -> io::Result<HttpState> {
    let listings = Arc::new(ListingService::new(
        ListingServicePorts {
            repository: Arc::new(DieselListingRepository::new(pool.clone())),
            geocoder: build_geocoder(settings)?,
            images: build_image_store(settings)?,
        },
        settings.retry_policy(),
    ));
    let accounts = Arc::new(UserAccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher),
    ));
    let map_token = settings
        .map_token()
        .map_err(|err| startup_error("map settings", err))?;

    Ok(HttpState::new(
        listings.clone() as Arc<dyn ListingCommand>,
        listings as Arc<dyn ListingQuery>,
        accounts,
    )
    .with_map_token(map_token)
    .with_upload_max_bytes(settings.upload_max_bytes()))
}
