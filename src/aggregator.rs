//! Resolve `(source, query, limit)` requests through the query cache.
//!
//! The [`Aggregator`] owns both the [`SourceRegistry`] and the [`QueryCache`].
//! A request is answered from the cache when its key is present; otherwise
//! the matching source is fetched and the result written through to the cache
//! before it is returned.

use crate::models::{ArticleRecord, CacheKey, SourceType};
use crate::sources::{SourceError, SourceRegistry};
use crate::utils::{CacheError, QueryCache};

/// Where a [`Resolution`]'s records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from the cache without a network call
    Cache,
    /// Fetched from the source adapter
    Source,
}

/// Outcome of [`Aggregator::resolve`]
#[derive(Debug)]
pub struct Resolution {
    pub key: CacheKey,
    pub records: Vec<ArticleRecord>,
    pub origin: Origin,
    /// Set when the source failed; `records` is then empty, and that empty result is cached
    pub source_error: Option<SourceError>,
    /// Set when the records were fetched but could not be written to disk
    pub persist_error: Option<CacheError>,
}

impl Resolution {
    pub fn from_cache(&self) -> bool {
        self.origin == Origin::Cache
    }
}

/// Errors that stop a request before any source is contacted
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("Source '{0}' is not available in this build")]
    UnregisteredSource(SourceType),
}

/// Cache-first request orchestrator
#[derive(Debug)]
pub struct Aggregator {
    registry: SourceRegistry,
    cache: QueryCache,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, cache: QueryCache) -> Self {
        Self { registry, cache }
    }

    /// Resolve a request from the cache, or from its source on a miss
    ///
    /// Every fetch outcome is written through, including empty ones. A source
    /// failure yields an empty result that is cached like any other and
    /// reported in [`Resolution::source_error`].
    pub async fn resolve(
        &mut self,
        source: SourceType,
        query: &str,
        limit: usize,
    ) -> Result<Resolution, AggregateError> {
        let key = CacheKey::new(source, query, limit);

        if let Some(records) = self.cache.get(&key) {
            tracing::debug!("Cache HIT for {}", key);
            return Ok(Resolution {
                records: records.to_vec(),
                key,
                origin: Origin::Cache,
                source_error: None,
                persist_error: None,
            });
        }
        tracing::debug!("Cache MISS for {}", key);

        let adapter = self
            .registry
            .get(source)
            .ok_or(AggregateError::UnregisteredSource(source))?;

        let (records, source_error) = match adapter.fetch(query, limit).await {
            Ok(records) => {
                tracing::debug!("Found {} records from {}", records.len(), source);
                (records, None)
            }
            Err(e) => {
                tracing::warn!("{} search for '{}' failed: {}", source, query, e);
                (Vec::new(), Some(e))
            }
        };

        let persist_error = match self.cache.put(key.clone(), records.clone()) {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("Failed to persist cache after fetching {}: {}", key, e);
                Some(e)
            }
        };

        Ok(Resolution {
            key,
            records,
            origin: Origin::Source,
            source_error,
            persist_error,
        })
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;
    use std::sync::Arc;

    fn aggregator_with(mock: Arc<MockSource>) -> Aggregator {
        let mut registry = SourceRegistry::empty();
        registry.register(mock);
        Aggregator::new(registry, QueryCache::in_memory())
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let mock = Arc::new(MockSource::new(SourceType::Arxiv).with_titles(&["A", "B", "C", "D"]));
        let mut aggregator = aggregator_with(Arc::clone(&mock));

        let first = aggregator
            .resolve(SourceType::Arxiv, "black hole", 3)
            .await
            .unwrap();
        let second = aggregator
            .resolve(SourceType::Arxiv, "black hole", 3)
            .await
            .unwrap();

        assert_eq!(mock.calls(), 1);
        assert_eq!(first.origin, Origin::Source);
        assert!(second.from_cache());
        assert_eq!(first.records.len(), 3);
        assert_eq!(first.records, second.records);
        assert_eq!(
            aggregator.cache().get(&first.key).unwrap(),
            first.records.as_slice()
        );
    }

    #[tokio::test]
    async fn test_key_includes_limit_and_verbatim_query() {
        let mock = Arc::new(MockSource::new(SourceType::Arxiv).with_titles(&["A", "B"]));
        let mut aggregator = aggregator_with(Arc::clone(&mock));

        aggregator.resolve(SourceType::Arxiv, "galaxy", 1).await.unwrap();
        aggregator.resolve(SourceType::Arxiv, "galaxy", 2).await.unwrap();
        aggregator.resolve(SourceType::Arxiv, "Galaxy", 2).await.unwrap();

        assert_eq!(mock.calls(), 3);
        assert_eq!(aggregator.cache().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let mock = Arc::new(MockSource::new(SourceType::PubMed));
        let mut aggregator = aggregator_with(Arc::clone(&mock));

        let first = aggregator
            .resolve(SourceType::PubMed, "no such topic", 5)
            .await
            .unwrap();
        let second = aggregator
            .resolve(SourceType::PubMed, "no such topic", 5)
            .await
            .unwrap();

        assert!(first.records.is_empty());
        assert!(second.records.is_empty());
        assert!(second.from_cache());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_source_error_is_reported_and_cached_empty() {
        let mock = Arc::new(MockSource::new(SourceType::CrossRef));
        mock.fail_unavailable("HTTP 503");
        let mut aggregator = aggregator_with(Arc::clone(&mock));

        let resolution = aggregator
            .resolve(SourceType::CrossRef, "gravity", 2)
            .await
            .unwrap();

        assert!(resolution.records.is_empty());
        assert!(resolution.source_error.unwrap().is_unavailable());
        assert!(resolution.persist_error.is_none());

        let key = CacheKey::new(SourceType::CrossRef, "gravity", 2);
        assert_eq!(aggregator.cache().get(&key), Some(&[][..]));

        let second = aggregator
            .resolve(SourceType::CrossRef, "gravity", 2)
            .await
            .unwrap();
        assert!(second.from_cache());
        assert!(second.records.is_empty());
        assert!(second.source_error.is_none());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_source() {
        let mock = Arc::new(MockSource::new(SourceType::Arxiv));
        let mut aggregator = aggregator_with(Arc::clone(&mock));

        let err = aggregator
            .resolve(SourceType::Doaj, "gravity", 2)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AggregateError::UnregisteredSource(SourceType::Doaj)
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_key_skips_registry_lookup() {
        let mut cache = QueryCache::in_memory();
        cache
            .put(CacheKey::new(SourceType::Doaj, "gravity", 2), Vec::new())
            .unwrap();
        let mut aggregator = Aggregator::new(SourceRegistry::empty(), cache);

        let resolution = aggregator
            .resolve(SourceType::Doaj, "gravity", 2)
            .await
            .unwrap();

        assert!(resolution.from_cache());
    }
}
