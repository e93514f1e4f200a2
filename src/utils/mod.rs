//! Utility modules supporting search operations.
//!
//! - [`HttpClient`]: shared HTTP client used by every source
//! - [`QueryCache`]: write-through cache of resolved queries
//! - [`match_keyword`] / [`scan_vocabulary`]: title keyword filtering
//!
//! # Keyword Filtering
//!
//! ```rust
//! use litsearch::models::{ArticleRecord, SourceType, Year};
//! use litsearch::utils::match_keyword;
//!
//! let records = vec![ArticleRecord {
//!     title: "Gravity waves".to_string(),
//!     authors: vec![],
//!     year: Year::Unknown,
//!     url: String::new(),
//!     source: SourceType::Arxiv,
//! }];
//!
//! let matches = match_keyword(&records, "GRAVITY");
//! assert_eq!(matches[0].position, 1);
//! ```

mod cache;
mod http;
mod keywords;

pub use cache::{CacheError, CacheStats, QueryCache};
pub use http::HttpClient;
pub use keywords::{match_keyword, scan_vocabulary, KeywordMatch, DEFAULT_KEYWORDS};
