//! Wanderlust listings marketplace.
//!
//! Hexagonal layout: [`domain`] holds the use-cases and ports,
//! [`inbound::http`] renders pages over them and [`outbound`] implements the
//! driven ports against PostgreSQL, Mapbox and Cloudinary.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
pub use middleware::{MethodOverride, Trace};
