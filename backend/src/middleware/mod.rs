//! Request middleware.
//!
//! Request lifecycle concerns that sit in front of routing: trace
//! identifiers and form method overrides.

pub mod method_override;
pub mod trace;

pub use method_override::MethodOverride;
pub use trace::Trace;
