//! Google Places client for the traffic enrichment pipeline.
//!
//! [`PlacesClient`] wraps the `nearbysearch` and `details` web-service
//! endpoints and implements [`adspace_core::DirectoryClient`].

mod client;
mod error;
mod retry;
mod types;

pub use client::{PlacesClient, DEFAULT_BASE_URL, DETAIL_FIELDS};
pub use error::PlacesError;
