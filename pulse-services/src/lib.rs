//! Ingestion, enrichment and broadcast services for the Pulse pipeline
//!
//! This crate holds the pipeline's moving parts: the SQLite-backed store,
//! the dedup/upsert resolver, sentiment analyzers, the per-cycle
//! ingestion orchestration, the live article broadcaster and the interval
//! scheduler.

pub mod analyzer;
pub mod broadcast;
pub mod ingest;
pub mod poller;
pub mod resolver;
pub mod storage;

pub use analyzer::{build_analyzer, AnalyzerKind, EngineAnalyzer, KeywordAnalyzer, SentimentAnalyzer};
pub use broadcast::ArticleBroadcaster;
pub use ingest::{upsert_latest_sentiment, IngestService};
pub use poller::{NewsPoller, PollerConfig, PollerHandle};
pub use resolver::{is_valid_external_url, resolve_remote};
pub use storage::{NewsStorage, StorageError};
