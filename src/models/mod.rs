//! Core data models for normalized records and cache keys.

mod article;
mod query;

pub use article::{ArticleRecord, SourceType, UnknownSource, Year};
pub use query::CacheKey;
