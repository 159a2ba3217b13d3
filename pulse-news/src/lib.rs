//! News provider client for the Pulse pipeline
//!
//! This crate fetches pages of articles from a NewsAPI-shaped provider,
//! classifying HTTP outcomes and retrying rate limits and server errors
//! with exponential backoff. Irrecoverable failures surface as an empty
//! page; the caller logs and continues.

pub mod backoff;
pub mod error;
pub mod newsapi;
pub mod types;

pub use backoff::compute_backoff;
pub use error::NewsError;
pub use newsapi::{NewsApiClient, NewsApiConfig};
