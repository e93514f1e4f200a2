//! # litsearch
//!
//! Search several bibliographic sources for a topic, normalize every result
//! into one [`ArticleRecord`] shape and cache the outcome per
//! `(source, query, limit)`.
//!
//! ## Architecture
//!
//! - [`models`]: `ArticleRecord`, `SourceType` and `CacheKey`
//! - [`sources`]: one adapter per source behind the [`Source`] trait, plus the
//!   shared normalizer every adapter returns through
//! - [`aggregator`]: cache-first request resolution
//! - [`utils`]: HTTP client, query cache and keyword filtering
//! - [`config`]: TOML file + environment configuration
//! - [`ui`]: terminal rendering

pub mod aggregator;
pub mod config;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{Aggregator, Resolution};
pub use models::{ArticleRecord, CacheKey, SourceType};
pub use sources::{Source, SourceError, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
