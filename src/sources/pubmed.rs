//! PubMed source implementation using the E-utilities API.
//!
//! PubMed is a two-step source: `esearch` resolves the query to a list of
//! PMIDs, then a single batched `esummary` call returns the document
//! summaries for all of them.

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{ArticleRecord, SourceType};
use crate::sources::normalize::{normalize_all, RawArticle, RawAuthors, RawDate};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// PubMed E-utilities API base URL
const PUBMED_EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// PubMed source
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl PubMedSource {
    /// Create a new PubMed source
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, PUBMED_EUTILS_BASE)
    }

    /// Point the source at another E-utilities root (mock servers in tests)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &str, limit: usize) -> String {
        let params = [
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", limit.to_string()),
            ("retmode", "xml".to_string()),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}/esearch.fcgi?{}", self.base_url, query_string)
    }

    /// Build the batched summary URL for specific PubMed IDs
    fn build_summary_url(&self, ids: &[String]) -> String {
        format!(
            "{}/esummary.fcgi?db=pubmed&id={}&retmode=json",
            self.base_url,
            ids.join(",")
        )
    }

    /// Parse E-utilities search response XML
    fn parse_search_response(xml: &str) -> Result<Vec<String>, SourceError> {
        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct ESearchResult {
            IdList: IdList,
        }

        #[derive(Debug, Deserialize)]
        struct IdList {
            #[serde(rename = "Id", default)]
            ids: Vec<String>,
        }

        let result: ESearchResult = from_str(xml).map_err(|e| {
            SourceError::MalformedResponse(format!("Failed to parse PubMed search XML: {}", e))
        })?;

        Ok(result.IdList.ids)
    }

    /// Parse E-utilities summary JSON, keeping the order of `uids`
    fn parse_summary_response(json: &str) -> Result<Vec<RawArticle>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct ESummaryResponse {
            result: ESummaryResult,
        }

        #[derive(Debug, Deserialize)]
        struct ESummaryResult {
            uids: Vec<String>,
            #[serde(flatten)]
            docs: HashMap<String, serde_json::Value>,
        }

        #[derive(Debug, Deserialize)]
        struct DocSummary {
            title: Option<String>,
            #[serde(default)]
            authors: Vec<SummaryAuthor>,
            pubdate: Option<String>,
            sortpubdate: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct SummaryAuthor {
            name: Option<String>,
        }

        let mut response: ESummaryResponse = serde_json::from_str(json)?;

        let mut fragments = Vec::with_capacity(response.result.uids.len());
        for uid in response.result.uids {
            let Some(doc) = response.result.docs.remove(&uid) else {
                tracing::debug!("PubMed summary missing for uid {}", uid);
                continue;
            };
            let doc: DocSummary = serde_json::from_value(doc)?;

            let mut raw = RawArticle::default()
                .authors(RawAuthors::Names(
                    doc.authors.into_iter().filter_map(|a| a.name).collect(),
                ))
                .url(format!("/{}/", uid));

            if let Some(title) = doc.title {
                raw = raw.title(title);
            }
            if let Some(date) = doc.pubdate.filter(|d| !d.trim().is_empty()).or(doc.sortpubdate) {
                raw = raw.date(RawDate::Text(date));
            }

            fragments.push(raw);
        }

        Ok(fragments)
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn source_type(&self) -> SourceType {
        SourceType::PubMed
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let search_url = self.build_search_url(query, limit);
        let xml = self.client.get_text(&search_url).await?;

        let mut ids = Self::parse_search_response(&xml)?;
        ids.truncate(limit);

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let summary_url = self.build_summary_url(&ids);
        let json = self.client.get_text(&summary_url).await?;
        let fragments = Self::parse_summary_response(&json)?;

        Ok(normalize_all(fragments, SourceType::PubMed, limit))
    }
}
