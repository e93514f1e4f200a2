//! DOAJ (Directory of Open Access Journals) source implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{ArticleRecord, SourceType};
use crate::sources::normalize::{normalize_all, RawArticle, RawAuthors, RawDate};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

const DOAJ_API_BASE: &str = "https://doaj.org";

/// Largest `pageSize` the search API accepts
const DOAJ_MAX_PAGE_SIZE: usize = 100;

/// DOAJ source
///
/// Uses the public article search API; no key required.
#[derive(Debug, Clone)]
pub struct DoajSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl DoajSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, DOAJ_API_BASE)
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
            "{}/api/search/articles/{}?page=1&pageSize={}",
            self.base_url,
            urlencoding::encode(query),
            limit.min(DOAJ_MAX_PAGE_SIZE)
        )
    }

    fn parse_response(json: &str) -> Result<Vec<RawArticle>, SourceError> {
        let data: DoajResponse = serde_json::from_str(json)?;
        Ok(data.results.into_iter().map(DoajArticle::into_raw).collect())
    }
}

#[async_trait]
impl Source for DoajSource {
    fn source_type(&self) -> SourceType {
        SourceType::Doaj
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.build_search_url(query, limit);
        let body = self.client.get_text(&url).await?;
        let fragments = Self::parse_response(&body)?;

        Ok(normalize_all(fragments, SourceType::Doaj, limit))
    }
}

// ===== DOAJ API Types =====

#[derive(Debug, Deserialize)]
struct DoajResponse {
    results: Vec<DoajArticle>,
}

#[derive(Debug, Deserialize)]
struct DoajArticle {
    id: Option<String>,
    created_date: Option<String>,
    #[serde(default)]
    bibjson: DoajBibJson,
}

#[derive(Debug, Default, Deserialize)]
struct DoajBibJson {
    title: Option<String>,
    year: Option<String>,
    #[serde(default)]
    author: Vec<DoajAuthor>,
    #[serde(default)]
    link: Vec<DoajLink>,
    #[serde(default)]
    identifier: Vec<DoajIdentifier>,
}

#[derive(Debug, Deserialize)]
struct DoajAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajLink {
    #[serde(rename = "type")]
    link_type: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajIdentifier {
    #[serde(rename = "type")]
    id_type: Option<String>,
    id: Option<String>,
}

impl DoajArticle {
    fn into_raw(self) -> RawArticle {
        let bib = self.bibjson;
        let mut raw = RawArticle::default().authors(RawAuthors::Names(
            bib.author.into_iter().filter_map(|a| a.name).collect(),
        ));

        if let Some(title) = bib.title {
            raw = raw.title(title);
        }

        if let Some(date) = bib.year.or(self.created_date) {
            raw = raw.date(RawDate::Text(date));
        }

        let fulltext = bib
            .link
            .into_iter()
            .filter(|l| l.link_type.as_deref() == Some("fulltext"))
            .find_map(|l| l.url);
        let doi = bib
            .identifier
            .into_iter()
            .filter(|i| i.id_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("doi")))
            .find_map(|i| i.id)
            .map(|doi| format!("https://doi.org/{}", doi));
        let landing = self.id.map(|id| format!("/article/{}", id));

        if let Some(url) = fulltext.or(doi).or(landing) {
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
        "total": 3,
        "page": 1,
        "pageSize": 10,
        "results": [
            {
                "id": "abc123",
                "created_date": "2020-04-01T00:00:00Z",
                "bibjson": {
                    "title": "Surface temperature of exoplanets",
                    "year": "2019",
                    "author": [{"name": "M. Mayor"}, {"name": "D. Queloz"}],
                    "link": [{"type": "fulltext", "url": "https://journal.example/exo.pdf"}],
                    "identifier": [{"type": "doi", "id": "10.1000/exo"}]
                }
            },
            {
                "id": "def456",
                "created_date": "2021-06-30T00:00:00Z",
                "bibjson": {
                    "title": "Tidal gravity",
                    "identifier": [{"type": "DOI", "id": "10.1000/tide"}]
                }
            },
            {
                "id": "ghi789"
            }
        ]
    }"#;

    fn source_for(server: &mockito::ServerGuard) -> DoajSource {
        DoajSource::with_base_url(Arc::new(HttpClient::new().unwrap()), server.url())
    }

    #[test]
    fn test_build_search_url() {
        let source = DoajSource::new(Arc::new(HttpClient::new().unwrap()));
        let url = source.build_search_url("dark matter", 4);

        assert_eq!(
            url,
            "https://doaj.org/api/search/articles/dark%20matter?page=1&pageSize=4"
        );
    }

    #[test]
    fn test_build_search_url_caps_page_size() {
        let source = DoajSource::new(Arc::new(HttpClient::new().unwrap()));
        let url = source.build_search_url("gravity", 500);

        assert!(url.ends_with("?page=1&pageSize=100"));
    }

    #[test]
    fn test_parse_response_link_preference() {
        let records = normalize_all(
            DoajSource::parse_response(SAMPLE).unwrap(),
            SourceType::Doaj,
            10,
        );

        assert_eq!(records.len(), 3);

        assert_eq!(records[0].url, "https://journal.example/exo.pdf");
        assert_eq!(records[0].authors, vec!["M. Mayor", "D. Queloz"]);
        assert_eq!(records[0].year, Year::Known("2019".to_string()));

        assert_eq!(records[1].url, "https://doi.org/10.1000/tide");
        assert_eq!(records[1].year, Year::Known("2021".to_string()));

        assert_eq!(records[2].title, "No title");
        assert_eq!(records[2].url, "https://doaj.org/article/ghi789");
        assert_eq!(records[2].year, Year::Unknown);
    }

    #[test]
    fn test_missing_results_is_malformed() {
        let err = DoajSource::parse_response(r#"{"total": 0}"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_fetch_enforces_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/search/articles/gravity")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "1".into()))
            .with_status(200)
            .with_body(SAMPLE)
            .expect(1)
            .create_async()
            .await;

        let records = source_for(&server).fetch("gravity", 1).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, SourceType::Doaj);
        mock.assert_async().await;
    }
}
