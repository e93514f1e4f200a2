//! arXiv source implementation.

use async_trait::async_trait;
use feed_rs::parser;
use std::sync::Arc;

use crate::models::{ArticleRecord, SourceType};
use crate::sources::normalize::{normalize_all, RawArticle, RawAuthors, RawDate};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
const ARXIV_API_BASE: &str = "http://export.arxiv.org";
/// arXiv rejects pages larger than this
const ARXIV_MAX_RESULTS: usize = 2000;

/// arXiv source
///
/// Queries the Atom export API rather than scraping the search page.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, ARXIV_API_BASE)
    }

    /// Point the source at another API root (mock servers in tests)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn build_search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/api/query?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&format!("all:{}", query)),
            limit.min(ARXIV_MAX_RESULTS)
        )
    }

    fn parse_feed(xml: &[u8]) -> Result<Vec<RawArticle>, SourceError> {
        let feed = parser::parse(xml)?;

        Ok(feed.entries.iter().map(Self::parse_entry).collect())
    }

    /// Parse arXiv Atom feed entry into a raw fragment
    fn parse_entry(entry: &feed_rs::model::Entry) -> RawArticle {
        let mut raw = RawArticle::default().authors(RawAuthors::Names(
            entry.authors.iter().map(|a| a.name.clone()).collect(),
        ));

        if let Some(title) = &entry.title {
            raw = raw.title(title.content.as_str());
        }

        if let Some(ts) = entry.published.or(entry.updated) {
            raw = raw.date(RawDate::Timestamp(ts));
        }

        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .map(|l| l.href.clone())
            .unwrap_or_else(|| entry.id.clone());
        raw.url(link)
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn source_type(&self) -> SourceType {
        SourceType::Arxiv
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.build_search_url(query, limit);
        let request = self.client.get(&url).header("Accept", "application/atom+xml");
        let body = self.client.send_text(request, &url).await?;
        let fragments = Self::parse_feed(body.as_bytes())?;

        Ok(normalize_all(fragments, SourceType::Arxiv, limit))
    }
}
