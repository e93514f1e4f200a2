//! Google Scholar source implementation.
//!
//! Google Scholar has no public API, so results are scraped from the HTML
//! result page. The markup changes without notice; every field is optional
//! here and falls back to the normalizer defaults when a selector misses.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, OnceLock};

use crate::models::{ArticleRecord, SourceType};
use crate::sources::normalize::{normalize_all, RawArticle, RawAuthors, RawDate};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

const GOOGLE_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Scholar serves a consent/bot page to unknown clients
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Scholar pages hold at most this many results
const SCHOLAR_PAGE_SIZE: usize = 20;

/// Selectors for one result page, parsed once
struct ResultSelectors {
    result: Selector,
    title: Selector,
    link: Selector,
    byline: Selector,
}

impl ResultSelectors {
    fn get() -> &'static ResultSelectors {
        static SELECTORS: OnceLock<ResultSelectors> = OnceLock::new();
        SELECTORS.get_or_init(|| ResultSelectors {
            result: Selector::parse("div.gs_ri").expect("valid selector"),
            title: Selector::parse("h3.gs_rt").expect("valid selector"),
            link: Selector::parse("h3.gs_rt a[href]").expect("valid selector"),
            byline: Selector::parse("div.gs_a").expect("valid selector"),
        })
    }
}

fn kind_marker_regex() -> &'static Regex {
    static KIND_RE: OnceLock<Regex> = OnceLock::new();
    KIND_RE.get_or_init(|| Regex::new(r"^\s*(?:\[[^\]]*\]\s*)+").expect("valid pattern"))
}

/// Google Scholar source
#[derive(Debug, Clone)]
pub struct GoogleScholarSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl GoogleScholarSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, GOOGLE_SCHOLAR_URL)
    }

    /// Point the source at another host (mock servers in tests)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn build_search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/scholar?hl=en&q={}&num={}",
            self.base_url,
            urlencoding::encode(query),
            limit.min(SCHOLAR_PAGE_SIZE)
        )
    }

    fn parse_results(html: &str) -> Vec<RawArticle> {
        let document = Html::parse_document(html);
        let selectors = ResultSelectors::get();

        document
            .select(&selectors.result)
            .map(|item| Self::parse_result(&item, selectors))
            .collect()
    }

    fn parse_result(item: &ElementRef, selectors: &ResultSelectors) -> RawArticle {
        let mut raw = RawArticle::default();

        if let Some(heading) = item.select(&selectors.title).next() {
            let text = heading.text().collect::<String>();
            raw = raw.title(kind_marker_regex().replace(&text, "").into_owned());
        }

        if let Some(href) = item
            .select(&selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            raw = raw.url(href);
        }

        // "A Einstein, B Podolsky - Physical review, 1935 - APS"
        if let Some(byline) = item.select(&selectors.byline).next() {
            let text = byline.text().collect::<String>().replace('\u{a0}', " ");
            let mut segments = text.split(" - ");
            if let Some(authors) = segments.next() {
                raw = raw.authors(RawAuthors::Joined(authors.to_string()));
            }
            let rest = segments.collect::<Vec<_>>().join(" - ");
            if !rest.trim().is_empty() {
                raw = raw.date(RawDate::Text(rest));
            }
        }

        raw
    }
}

#[async_trait]
impl Source for GoogleScholarSource {
    fn source_type(&self) -> SourceType {
        SourceType::GoogleScholar
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ArticleRecord>, SourceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.build_search_url(query, limit);
        let request = self.client.get(&url).header("User-Agent", BROWSER_USER_AGENT);
        let html = self.client.send_text(request, &url).await?;

        let fragments = Self::parse_results(&html);
        if fragments.is_empty() && !html.contains("gs_ri") && html.contains("captcha") {
            return Err(SourceError::MalformedResponse(
                "Google Scholar returned a captcha page instead of results".to_string(),
            ));
        }

        Ok(normalize_all(fragments, SourceType::GoogleScholar, limit))
    }
}
