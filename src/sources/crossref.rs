//! CrossRef source implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{ArticleRecord, SourceType};
use crate::sources::normalize::{normalize_all, AuthorParts, RawArticle, RawAuthors, RawDate};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// Largest `rows` value the works API accepts
const CROSSREF_MAX_ROWS: usize = 1000;

/// CrossRef source
///
/// Uses the CrossRef REST API `works` search.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl CrossRefSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, CROSSREF_API_BASE)
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
            "{}/works?query={}&rows={}",
            self.base_url,
            urlencoding::encode(query),
            limit.min(CROSSREF_MAX_ROWS)
        )
    }

    fn parse_response(json: &str) -> Result<Vec<RawArticle>, SourceError> {
        let data: CRResponse = serde_json::from_str(json)?;
        Ok(data.message.items.into_iter().map(CRItem::into_raw).collect())
    }
}

#[async_trait]
impl Source for CrossRefSource {
    fn source_type(&self) -> SourceType {
        SourceType::CrossRef
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.build_search_url(query, limit);
        let body = self.client.get_text(&url).await?;
        let fragments = Self::parse_response(&body)?;

        Ok(normalize_all(fragments, SourceType::CrossRef, limit))
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: CRMessage,
}

#[derive(Debug, Deserialize)]
struct CRMessage {
    items: Vec<CRItem>,
}

#[derive(Debug, Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CRItem {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    author: Option<Vec<CRAuthor>>,
    #[serde(rename = "published-print")]
    published_print: Option<CRDate>,
    #[serde(rename = "published-online")]
    published_online: Option<CRDate>,
    issued: Option<CRDate>,
    created: Option<CRDate>,
}

#[derive(Debug, Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i64>>>,
}

impl CRDate {
    /// Leading non-null parts of the first date, e.g. `[2021, 6, 1]`
    fn parts(&self) -> Option<Vec<i64>> {
        let parts: Vec<i64> = self
            .date_parts
            .first()?
            .iter()
            .map_while(|p| *p)
            .collect();
        (!parts.is_empty()).then_some(parts)
    }
}

impl CRItem {
    fn into_raw(self) -> RawArticle {
        let mut raw = RawArticle::default();

        if let Some(title) = self.title.into_iter().find(|t| !t.trim().is_empty()) {
            raw = raw.title(title);
        }

        if let Some(authors) = self.author {
            raw = raw.authors(RawAuthors::Parts(
                authors
                    .into_iter()
                    .map(|a| AuthorParts {
                        given: a.given,
                        family: a.family,
                        literal: a.name,
                    })
                    .collect(),
            ));
        }

        let date = [
            &self.published_print,
            &self.published_online,
            &self.issued,
            &self.created,
        ]
        .into_iter()
        .flatten()
        .find_map(CRDate::parts);
        if let Some(parts) = date {
            raw = raw.date(RawDate::Parts(parts));
        }

        let url = self
            .url
            .or_else(|| self.doi.map(|doi| format!("https://doi.org/{}", doi)));
        if let Some(url) = url {
            raw = raw.url(url);
        }

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Year;
    use mockito::Matcher;

    const SAMPLE: &str = r#"{
        "status": "ok",
        "message": {
            "total-results": 3,
            "items": [
                {
                    "DOI": "10.1103/PhysRev.47.777",
                    "URL": "http://dx.doi.org/10.1103/physrev.47.777",
                    "title": ["Can Quantum-Mechanical Description of Physical Reality Be Considered Complete?"],
                    "author": [
                        {"given": "A.", "family": "Einstein"},
                        {"given": "B.", "family": "Podolsky"},
                        {"name": "Anonymous Referee Consortium"}
                    ],
                    "published-print": {"date-parts": [[1935, 5, 15]]}
                },
                {
                    "DOI": "10.1000/no-author",
                    "title": ["Gravity without authors"],
                    "issued": {"date-parts": [[null]]},
                    "created": {"date-parts": [[2019, 1, 2]]}
                },
                {
                    "title": []
                }
            ]
        }
    }"#;

    fn source_for(server: &mockito::ServerGuard) -> CrossRefSource {
        CrossRefSource::with_base_url(Arc::new(HttpClient::new().unwrap()), server.url())
    }

    #[test]
    fn test_build_search_url() {
        let source = CrossRefSource::new(Arc::new(HttpClient::new().unwrap()));
        let url = source.build_search_url("black hole", 5);

        assert!(url.starts_with("https://api.crossref.org/works?"));
        assert!(url.contains("query=black%20hole"));
        assert!(url.contains("rows=5"));

        let url = source.build_search_url("black hole", 5000);
        assert!(url.ends_with("&rows=1000"));
    }

    #[test]
    fn test_parse_response_maps_fields() {
        let records = normalize_all(
            CrossRefSource::parse_response(SAMPLE).unwrap(),
            SourceType::CrossRef,
            10,
        );

        assert_eq!(records.len(), 3);

        let epr = &records[0];
        assert_eq!(
            epr.authors,
            vec!["A. Einstein", "B. Podolsky", "Anonymous Referee Consortium"]
        );
        assert_eq!(epr.year, Year::Known("1935".to_string()));
        assert_eq!(epr.url, "http://dx.doi.org/10.1103/physrev.47.777");
    }

    #[test]
    fn test_missing_author_gives_empty_list() {
        let records = normalize_all(
            CrossRefSource::parse_response(SAMPLE).unwrap(),
            SourceType::CrossRef,
            10,
        );

        let item = &records[1];
        assert_eq!(item.title, "Gravity without authors");
        assert!(item.authors.is_empty());
        // issued has only a null part, so created is used
        assert_eq!(item.year, Year::Known("2019".to_string()));
        assert_eq!(item.url, "https://doi.org/10.1000/no-author");

        let bare = &records[2];
        assert_eq!(bare.title, "No title");
        assert_eq!(bare.year, Year::Unknown);
        assert_eq!(bare.url, "");
    }

    #[test]
    fn test_missing_items_is_malformed() {
        let err = CrossRefSource::parse_response(r#"{"message": {"total-results": 0}}"#)
            .unwrap_err();
        assert!(err.is_malformed());

        let err = CrossRefSource::parse_response(r#"{"message": {"items": [{"title": 7}]}}"#)
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_fetch_enforces_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/works")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "gravity".into()),
                Matcher::UrlEncoded("rows".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SAMPLE)
            .expect(1)
            .create_async()
            .await;

        let records = source_for(&server).fetch("gravity", 2).await.unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.source == SourceType::CrossRef));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = source_for(&server).fetch("gravity", 2).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_fetch_zero_limit_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let records = source_for(&server).fetch("gravity", 0).await.unwrap();

        assert!(records.is_empty());
        mock.assert_async().await;
    }
}
