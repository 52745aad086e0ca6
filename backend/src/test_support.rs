//! Test utilities for the wanderlust crate.
//!
//! In-memory adapters and request builders shared by unit tests (in `src/`)
//! and integration tests (in `tests/`). Compiled for tests and behind the
//! `test-support` feature.

mod doubles;
mod memory;
mod multipart;

pub use doubles::{PlainPasswordHasher, RecordingImageStore, ScriptedGeocoder};
pub use memory::InMemoryStore;
pub use multipart::MultipartBody;
