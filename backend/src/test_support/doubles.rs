//! Scriptable doubles for the geocoding, storage and hashing ports.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{
    Geocoder, GeocoderError, ImageStore, ImageStoreError, ImageUpload, PasswordHasher,
    PasswordHasherError,
};
use crate::domain::{Geometry, ListingImage, Password, PasswordHash};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

type GeocodeOutcome = Result<Option<Geometry>, GeocoderError>;

/// Geocoder answering from a script, then from a fallback.
#[derive(Debug)]
pub struct ScriptedGeocoder {
    fallback: Option<Geometry>,
    script: Mutex<VecDeque<GeocodeOutcome>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    /// Resolve every query to `fallback` once the script is exhausted.
    pub fn new(fallback: Option<Geometry>) -> Self {
        Self {
            fallback,
            script: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answer the next unscripted call with `outcome`.
    #[must_use]
    pub fn then(self, outcome: GeocodeOutcome) -> Self {
        lock(&self.script).push_back(outcome);
        self
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Option<Geometry>, GeocoderError> {
        lock(&self.queries).push(query.to_owned());
        let scripted = lock(&self.script).pop_front();
        scripted.unwrap_or(Ok(self.fallback))
    }
}

/// Image store that records uploads and returns a predictable reference.
#[derive(Debug, Default)]
pub struct RecordingImageStore {
    uploads: Mutex<Vec<String>>,
}

impl RecordingImageStore {
    /// File names uploaded so far.
    pub fn uploads(&self) -> Vec<String> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, upload: &ImageUpload) -> Result<ListingImage, ImageStoreError> {
        let mut uploads = lock(&self.uploads);
        uploads.push(upload.filename.clone());
        Ok(ListingImage {
            url: format!(
                "https://res.example.test/demo/image/upload/v{}/{}",
                uploads.len(),
                upload.filename
            ),
            filename: format!("wanderlust_TEST/{}", upload.filename),
        })
    }
}

/// Reversible "hash" so tests avoid Argon2's cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPasswordHasher;

const PLAIN_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::new(format!("{PLAIN_PREFIX}{}", password.expose())))
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let Some(stored) = hash.as_str().strip_prefix(PLAIN_PREFIX) else {
            return Err(PasswordHasherError::malformed_hash("missing plain$ prefix"));
        };
        Ok(stored == password.expose())
    }
}
