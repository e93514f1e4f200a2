//! Shared normalization policy for source payloads.
//!
//! Adapters only extract whatever fields their upstream offers into a
//! [`RawArticle`]; the fallback rules live here so every source applies the
//! same defaults:
//!
//! | Field   | Accepted shapes                              | Default       |
//! |---------|----------------------------------------------|---------------|
//! | title   | any text                                     | `"No title"`  |
//! | authors | joined string, name list, given/family parts | empty list    |
//! | year    | date text, date parts, timestamp             | `Year::Unknown` |
//! | url     | absolute URL or site-relative path           | `""`          |

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::models::{ArticleRecord, SourceType, Year};

/// Title used when a payload carries none
pub const NO_TITLE: &str = "No title";

/// Author representation as given by a source
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawAuthors {
    #[default]
    Missing,
    /// One string holding every author, e.g. `"A Smith, B Jones"`
    Joined(String),
    /// One display name per author
    Names(Vec<String>),
    /// Structured names
    Parts(Vec<AuthorParts>),
}

/// Structured author name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorParts {
    pub given: Option<String>,
    pub family: Option<String>,
    /// Literal name (organisations, consortia); preferred over given/family
    pub literal: Option<String>,
}

/// Date representation as given by a source
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    /// Free-form text such as `"2020 Jan 5"` or `"2019-11-02"`
    Text(String),
    /// Structured parts, year first
    Parts(Vec<i64>),
    /// Exact publication timestamp
    Timestamp(DateTime<Utc>),
}

/// One result fragment extracted from a source payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArticle {
    pub title: Option<String>,
    pub authors: RawAuthors,
    pub date: Option<RawDate>,
    pub url: Option<String>,
}

impl RawArticle {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn authors(mut self, authors: RawAuthors) -> Self {
        self.authors = authors;
        self
    }

    pub fn date(mut self, date: RawDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Map a raw fragment into an [`ArticleRecord`] tagged with `source`
pub fn normalize(raw: RawArticle, source: SourceType) -> ArticleRecord {
    ArticleRecord {
        title: normalize_title(raw.title.as_deref()),
        authors: normalize_authors(raw.authors),
        year: raw.date.as_ref().map(extract_year).unwrap_or(Year::Unknown),
        url: normalize_url(raw.url.as_deref(), source),
        source,
    }
}

/// Normalize at most `limit` fragments, pulling no more than needed
pub fn normalize_all<I>(fragments: I, source: SourceType, limit: usize) -> Vec<ArticleRecord>
where
    I: IntoIterator<Item = RawArticle>,
{
    fragments
        .into_iter()
        .take(limit)
        .map(|raw| normalize(raw, source))
        .collect()
}

fn normalize_title(title: Option<&str>) -> String {
    let collapsed = title
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    if collapsed.is_empty() {
        NO_TITLE.to_string()
    } else {
        collapsed
    }
}

fn normalize_authors(authors: RawAuthors) -> Vec<String> {
    match authors {
        RawAuthors::Missing => Vec::new(),
        RawAuthors::Joined(joined) => {
            let separator = if joined.contains(';') { ';' } else { ',' };
            joined
                .split(separator)
                .filter_map(clean_name)
                .collect()
        }
        RawAuthors::Names(names) => names.iter().filter_map(|n| clean_name(n)).collect(),
        RawAuthors::Parts(parts) => parts.iter().filter_map(display_name).collect(),
    }
}

fn display_name(parts: &AuthorParts) -> Option<String> {
    if let Some(name) = parts.literal.as_deref().and_then(clean_name) {
        return Some(name);
    }

    let given = parts.given.as_deref().unwrap_or("");
    let family = parts.family.as_deref().unwrap_or("");
    clean_name(&format!("{} {}", given, family))
}

fn clean_name(name: &str) -> Option<String> {
    let name = name
        .trim()
        .trim_end_matches('…')
        .trim_end_matches("...")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn year_regex() -> &'static Regex {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    YEAR_RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").expect("year pattern is valid")
    })
}

/// Derive a four-digit year from any supported date shape
pub fn extract_year(date: &RawDate) -> Year {
    match date {
        RawDate::Text(text) => year_regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Year::Known(m.as_str().to_string()))
            .unwrap_or(Year::Unknown),
        RawDate::Parts(parts) => match parts.first() {
            Some(year) if (1000..=9999).contains(year) => Year::Known(year.to_string()),
            _ => Year::Unknown,
        },
        RawDate::Timestamp(ts) if (1000..=9999).contains(&ts.year()) => {
            Year::Known(ts.year().to_string())
        }
        RawDate::Timestamp(_) => Year::Unknown,
    }
}

fn normalize_url(url: Option<&str>, source: SourceType) -> String {
    let url = url.map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return String::new();
    }

    if let Ok(absolute) = Url::parse(url) {
        return absolute.to_string();
    }

    Url::parse(source.site_url())
        .and_then(|site| site.join(url))
        .map(|joined| joined.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_fragment_gets_every_default() {
        let record = normalize(RawArticle::default(), SourceType::CrossRef);

        assert_eq!(record.title, NO_TITLE);
        assert!(record.authors.is_empty());
        assert_eq!(record.year, Year::Unknown);
        assert_eq!(record.url, "");
        assert_eq!(record.source, SourceType::CrossRef);
    }

    #[test]
    fn test_partial_fragments_never_lose_fields() {
        let only_title = normalize(RawArticle::default().title("Dark matter"), SourceType::Doaj);
        assert_eq!(only_title.title, "Dark matter");
        assert!(only_title.authors.is_empty());
        assert_eq!(only_title.year, Year::Unknown);

        let only_url = normalize(
            RawArticle::default().url("https://example.org/a"),
            SourceType::Doaj,
        );
        assert_eq!(only_url.title, NO_TITLE);
        assert_eq!(only_url.url, "https://example.org/a");

        let only_date = normalize(
            RawArticle::default().date(RawDate::Text("2017".to_string())),
            SourceType::Doaj,
        );
        assert_eq!(only_date.year, Year::Known("2017".to_string()));
        assert_eq!(only_date.title, NO_TITLE);
    }

    #[test]
    fn test_blank_title_falls_back() {
        let record = normalize(RawArticle::default().title("  \n "), SourceType::Arxiv);
        assert_eq!(record.title, NO_TITLE);
    }

    #[test]
    fn test_title_whitespace_collapsed() {
        let record = normalize(
            RawArticle::default().title("Quasi-normal modes of\n  rotating black holes"),
            SourceType::Arxiv,
        );
        assert_eq!(record.title, "Quasi-normal modes of rotating black holes");
    }

    #[test]
    fn test_joined_authors_split() {
        let authors = normalize_authors(RawAuthors::Joined(
            "A Einstein, B Podolsky,  N Rosen…".to_string(),
        ));
        assert_eq!(authors, vec!["A Einstein", "B Podolsky", "N Rosen"]);

        let semicolons = normalize_authors(RawAuthors::Joined("Smith, J.; Doe, A.".to_string()));
        assert_eq!(semicolons, vec!["Smith, J.", "Doe, A."]);
    }

    #[test]
    fn test_name_list_drops_blanks() {
        let authors = normalize_authors(RawAuthors::Names(vec![
            " Vera Rubin ".to_string(),
            "".to_string(),
            "Kent Ford".to_string(),
        ]));
        assert_eq!(authors, vec!["Vera Rubin", "Kent Ford"]);
    }

    #[test]
    fn test_author_parts() {
        let authors = normalize_authors(RawAuthors::Parts(vec![
            AuthorParts {
                given: Some("Ada".to_string()),
                family: Some("Lovelace".to_string()),
                literal: None,
            },
            AuthorParts {
                given: None,
                family: Some("Curie".to_string()),
                literal: None,
            },
            AuthorParts {
                given: Some("ignored".to_string()),
                family: None,
                literal: Some("LIGO Scientific Collaboration".to_string()),
            },
            AuthorParts::default(),
        ]));
        assert_eq!(
            authors,
            vec!["Ada Lovelace", "Curie", "LIGO Scientific Collaboration"]
        );
    }

    #[test]
    fn test_extract_year_from_text() {
        let year = |s: &str| extract_year(&RawDate::Text(s.to_string()));

        assert_eq!(year("2020 Jan 5"), Year::Known("2020".to_string()));
        assert_eq!(year("2019-11-02"), Year::Known("2019".to_string()));
        assert_eq!(year("Physical review, 1935 - APS"), Year::Known("1935".to_string()));
        assert_eq!(year("n.d."), Year::Unknown);
        assert_eq!(year("123456"), Year::Unknown);
        assert_eq!(year(""), Year::Unknown);
    }

    #[test]
    fn test_extract_year_from_parts() {
        assert_eq!(
            extract_year(&RawDate::Parts(vec![2021, 6, 1])),
            Year::Known("2021".to_string())
        );
        assert_eq!(extract_year(&RawDate::Parts(vec![])), Year::Unknown);
        assert_eq!(extract_year(&RawDate::Parts(vec![21])), Year::Unknown);
    }

    #[test]
    fn test_extract_year_from_timestamp() {
        let ts = Utc.with_ymd_and_hms(2007, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(
            extract_year(&RawDate::Timestamp(ts)),
            Year::Known("2007".to_string())
        );
    }

    #[test]
    fn test_relative_url_joined_onto_site() {
        let record = normalize(RawArticle::default().url("/31452104/"), SourceType::PubMed);
        assert_eq!(record.url, "https://pubmed.ncbi.nlm.nih.gov/31452104/");

        let absolute = normalize(
            RawArticle::default().url("https://arxiv.org/abs/2101.00001v1"),
            SourceType::PubMed,
        );
        assert_eq!(absolute.url, "https://arxiv.org/abs/2101.00001v1");
    }

    #[test]
    fn test_normalize_all_respects_limit() {
        let fragments = (0..10).map(|i| RawArticle::default().title(format!("Paper {}", i)));

        let records = normalize_all(fragments, SourceType::Arxiv, 3);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].title, "Paper 2");

        let short = normalize_all(vec![RawArticle::default()], SourceType::Arxiv, 5);
        assert_eq!(short.len(), 1);

        let none = normalize_all(vec![RawArticle::default()], SourceType::Arxiv, 0);
        assert!(none.is_empty());
    }
}
