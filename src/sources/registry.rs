//! Registry mapping each source identifier to its adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

#[cfg(feature = "source-arxiv")]
use super::arxiv::ArxivSource;
#[cfg(feature = "source-crossref")]
use super::crossref::CrossRefSource;
#[cfg(feature = "source-doaj")]
use super::doaj::DoajSource;
#[cfg(feature = "source-google_scholar")]
use super::google_scholar::GoogleScholarSource;
#[cfg(feature = "source-pubmed")]
use super::pubmed::PubMedSource;
use super::Source;
use crate::models::SourceType;
use crate::utils::HttpClient;

/// Registry for all available source adapters
///
/// Keys are the closed [`SourceType`] set, so an unknown identifier can never
/// reach a lookup; it is rejected when the text is parsed.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<SourceType, Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create a registry with every compiled-in source sharing `client`
    #[allow(unused_variables, unused_mut)]
    pub fn new(client: Arc<HttpClient>) -> Self {
        let mut registry = Self::empty();

        #[cfg(feature = "source-arxiv")]
        registry.register(Arc::new(ArxivSource::new(Arc::clone(&client))));
        #[cfg(feature = "source-pubmed")]
        registry.register(Arc::new(PubMedSource::new(Arc::clone(&client))));
        #[cfg(feature = "source-crossref")]
        registry.register(Arc::new(CrossRefSource::new(Arc::clone(&client))));
        #[cfg(feature = "source-google_scholar")]
        registry.register(Arc::new(GoogleScholarSource::new(Arc::clone(&client))));
        #[cfg(feature = "source-doaj")]
        registry.register(Arc::new(DoajSource::new(Arc::clone(&client))));

        registry
    }

    /// Create a registry with no sources
    pub fn empty() -> Self {
        Self {
            sources: BTreeMap::new(),
        }
    }

    /// Register a source, replacing any adapter already serving its type
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.source_type(), source);
    }

    /// Get a source by type
    pub fn get(&self, source: SourceType) -> Option<&Arc<dyn Source>> {
        self.sources.get(&source)
    }

    /// Get all registered sources in display order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.values()
    }

    /// Get all registered source types
    pub fn types(&self) -> impl Iterator<Item = SourceType> + '_ {
        self.sources.keys().copied()
    }

    /// Check if a source exists
    pub fn has(&self, source: SourceType) -> bool {
        self.sources.contains_key(&source)
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
