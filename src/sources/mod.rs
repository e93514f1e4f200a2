//! Source adapters with a trait-based architecture.
//!
//! This module defines the [`Source`] trait that every bibliographic source
//! implements. An adapter issues the request(s) for one upstream service,
//! extracts each result into a [`RawArticle`] and hands it to the shared
//! [`normalize`](normalize::normalize) policy, so all sources return the same
//! [`ArticleRecord`] shape.
//!
//! # Feature Flags
//!
//! Individual sources can be disabled at compile time using Cargo features:
//!
//! - `arxiv` - Enable arXiv source (default: enabled)
//! - `pubmed` - Enable PubMed source (default: enabled)
//! - `crossref` - Enable CrossRef source (default: enabled)
//! - `google_scholar` - Enable Google Scholar source (default: enabled)
//! - `doaj` - Enable DOAJ source (default: enabled)
//!
//! # Feature Groups
//!
//! - `apis` - every source with a documented API (all but Google Scholar)
//! - `full` - All sources (default)
//!
//! # Failures
//!
//! Adapters never panic on bad upstream data. A transport failure, timeout or
//! non-2xx status is [`SourceError::Unavailable`]; a payload that does not have
//! the expected shape is [`SourceError::MalformedResponse`]. The
//! [`Aggregator`](crate::aggregator::Aggregator) turns either into an empty
//! result plus a diagnostic.

#[cfg(feature = "source-arxiv")]
mod arxiv;
#[cfg(feature = "source-crossref")]
mod crossref;
#[cfg(feature = "source-doaj")]
mod doaj;
#[cfg(feature = "source-google_scholar")]
mod google_scholar;
#[cfg(feature = "source-pubmed")]
mod pubmed;
mod registry;

pub mod mock;
pub mod normalize;

#[cfg(feature = "source-arxiv")]
pub use arxiv::ArxivSource;
#[cfg(feature = "source-crossref")]
pub use crossref::CrossRefSource;
#[cfg(feature = "source-doaj")]
pub use doaj::DoajSource;
#[cfg(feature = "source-google_scholar")]
pub use google_scholar::GoogleScholarSource;
pub use mock::MockSource;
pub use normalize::{normalize, normalize_all, AuthorParts, RawArticle, RawAuthors, RawDate};
#[cfg(feature = "source-pubmed")]
pub use pubmed::PubMedSource;
pub use registry::SourceRegistry;

use crate::models::{ArticleRecord, SourceType};
use async_trait::async_trait;

/// The Source trait defines the interface for all source adapters.
///
/// # Implementing a New Source
///
/// 1. Add a variant to [`SourceType`]
/// 2. Create a struct that implements `Source`, building records only through
///    [`normalize_all`]
/// 3. Register it in `SourceRegistry::new()`
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Which source this adapter serves
    fn source_type(&self) -> SourceType;

    /// Identifier used in cache keys, e.g. "arxiv"
    fn id(&self) -> &'static str {
        self.source_type().id()
    }

    /// Human-readable name of this source
    fn name(&self) -> &'static str {
        self.source_type().name()
    }

    /// Fetch at most `limit` normalized records for `query`
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure, timeout or non-success status
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Payload did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl SourceError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SourceError::MalformedResponse(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::MalformedResponse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::MalformedResponse(format!("XML: {}", err))
    }
}

impl From<feed_rs::parser::ParseFeedError> for SourceError {
    fn from(err: feed_rs::parser::ParseFeedError) -> Self {
        SourceError::MalformedResponse(format!("Atom feed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SourceError = json_err.into();
        assert!(err.is_malformed());
        assert!(!err.is_unavailable());

        let feed_err = feed_rs::parser::parse(&b"not a feed"[..]).unwrap_err();
        let err: SourceError = feed_err.into();
        assert!(err.is_malformed());

        let err = SourceError::Unavailable("timeout".to_string());
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "Source unavailable: timeout");
    }
}
