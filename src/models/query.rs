//! Cache key identifying a unique search request.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SourceType;

/// Composite key `(source, query, limit)`
///
/// The query text is kept verbatim: no trimming or case folding happens here,
/// so `"Black hole"` and `"black hole"` are different requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub source: SourceType,
    pub query: String,
    pub limit: usize,
}

impl CacheKey {
    pub fn new(source: SourceType, query: impl Into<String>, limit: usize) -> Self {
        Self {
            source,
            query: query.into(),
            limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.source.id(), self.query, self.limit)
    }
}
