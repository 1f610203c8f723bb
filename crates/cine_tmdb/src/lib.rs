mod client;
mod error;
mod handlers;
pub mod models;
pub mod params;
mod source;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, PAGE_SIZE};
pub use error::{Error, Result, StatusCode, TmdbError};
pub use handlers::{MoviesHandler, PeopleHandler};
pub use source::ListingSource;
