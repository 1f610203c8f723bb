//! Shared helpers for tests that talk to a mock TMDB.

pub mod fixtures;
pub mod mock;
