//! Core types for the Pulse news sentiment pipeline
//!
//! This crate defines the shared data structures used across the pipeline:
//! articles as received from the provider, persisted articles, sentiment
//! records and the canonical label set.

pub mod article;
pub mod error;
pub mod sentiment;

pub use article::{Article, ArticleWithSentiments, RemoteArticle};
pub use error::{PulseError, PulseResult};
pub use sentiment::{Sentiment, SentimentLabel, SentimentResult};
