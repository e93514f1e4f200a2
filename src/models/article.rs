//! Article record model shared by every source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The bibliographic source that produced a record
///
/// The set is closed: every value has an adapter in [`crate::sources`]
/// (subject to the `source-*` cargo features).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Arxiv,
    #[serde(rename = "pubmed")]
    PubMed,
    #[serde(rename = "crossref")]
    CrossRef,
    GoogleScholar,
    Doaj,
}

impl SourceType {
    /// Every source, in display order
    pub const ALL: [SourceType; 5] = [
        SourceType::Arxiv,
        SourceType::PubMed,
        SourceType::CrossRef,
        SourceType::GoogleScholar,
        SourceType::Doaj,
    ];

    /// Returns the display name of the source
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::Arxiv => "arXiv",
            SourceType::PubMed => "PubMed",
            SourceType::CrossRef => "CrossRef",
            SourceType::GoogleScholar => "Google Scholar",
            SourceType::Doaj => "DOAJ",
        }
    }

    /// Returns the source identifier used in cache keys and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            SourceType::Arxiv => "arxiv",
            SourceType::PubMed => "pubmed",
            SourceType::CrossRef => "crossref",
            SourceType::GoogleScholar => "google_scholar",
            SourceType::Doaj => "doaj",
        }
    }

    /// Public site that relative links from this source resolve against
    pub fn site_url(&self) -> &'static str {
        match self {
            SourceType::Arxiv => "https://arxiv.org",
            SourceType::PubMed => "https://pubmed.ncbi.nlm.nih.gov",
            SourceType::CrossRef => "https://doi.org",
            SourceType::GoogleScholar => "https://scholar.google.com",
            SourceType::Doaj => "https://doaj.org",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown source identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source '{0}' (expected one of: arxiv, pubmed, crossref, google_scholar, doaj)")]
pub struct UnknownSource(pub String);

impl FromStr for SourceType {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SourceType::ALL
            .into_iter()
            .find(|source| source.id() == wanted)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

/// Publication year of a record
///
/// Kept as text: a year is only ever shown and compared, never computed with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Year {
    /// A four-digit year, e.g. `"2021"`
    Known(String),
    /// No four-digit year could be derived from the payload
    Unknown,
}

impl Year {
    pub fn as_str(&self) -> &str {
        match self {
            Year::Known(year) => year,
            Year::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Year::Known(_))
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bibliographic record in the common normalized shape
///
/// Records are only built by [`crate::sources::normalize`], which guarantees
/// every field is populated (see the defaults documented there).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Title, never empty (`"No title"` when the source had none)
    pub title: String,

    /// Author display names in source order
    pub authors: Vec<String>,

    /// Publication year
    pub year: Year,

    /// Canonical link to the work, possibly empty
    pub url: String,

    /// Source that produced this record
    pub source: SourceType,
}

impl ArticleRecord {
    /// Authors joined for single-line display
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        }
    }
}
