//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{ArticleRecord, SourceType};
use crate::sources::normalize::{normalize_all, RawArticle};
use crate::sources::{Source, SourceError};

/// Canned outcome returned by [`MockSource`]
#[derive(Debug, Clone)]
enum MockOutcome {
    Fragments(Vec<RawArticle>),
    Unavailable(String),
    Malformed(String),
}

/// A mock source that serves predefined fragments and counts its calls.
#[derive(Debug)]
pub struct MockSource {
    source_type: SourceType,
    outcome: Mutex<MockOutcome>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a mock that answers as `source_type` with no results.
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            outcome: Mutex::new(MockOutcome::Fragments(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve these fragments (normalized and limited like a real adapter).
    pub fn with_fragments(self, fragments: Vec<RawArticle>) -> Self {
        self.set_outcome(MockOutcome::Fragments(fragments));
        self
    }

    /// Serve one fragment per title.
    pub fn with_titles(self, titles: &[&str]) -> Self {
        let fragments = titles
            .iter()
            .map(|t| RawArticle::default().title(*t))
            .collect();
        self.with_fragments(fragments)
    }

    /// Fail every call with `SourceError::Unavailable`.
    pub fn fail_unavailable(&self, reason: impl Into<String>) {
        self.set_outcome(MockOutcome::Unavailable(reason.into()));
    }

    /// Fail every call with `SourceError::MalformedResponse`.
    pub fn fail_malformed(&self, reason: impl Into<String>) {
        self.set_outcome(MockOutcome::Malformed(reason.into()));
    }

    /// Number of times `fetch` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_outcome(&self, outcome: MockOutcome) {
        let mut guard = self.outcome.lock().unwrap_or_else(|e| e.into_inner());
        *guard = outcome;
    }
}

#[async_trait]
impl Source for MockSource {
    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn fetch(&self, _query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let outcome = self
            .outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match outcome {
            MockOutcome::Fragments(fragments) => {
                Ok(normalize_all(fragments, self.source_type, limit))
            }
            MockOutcome::Unavailable(reason) => Err(SourceError::Unavailable(reason)),
            MockOutcome::Malformed(reason) => Err(SourceError::MalformedResponse(reason)),
        }
    }
}
