//! Shared helper utilities for backend integration tests.

pub mod browser;
