//! Title keyword matching over a result set.

use serde::Serialize;

use crate::models::ArticleRecord;

/// Vocabulary offered when the user gives no keyword
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "gravity",
    "temperature",
    "black hole",
    "dark matter",
    "galaxy",
    "exoplanet",
    "neutron star",
    "cosmic",
];

/// A record whose title contains the keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    /// 1-based position of the record in the scanned sequence
    pub position: usize,
    pub title: String,
}

/// Find records whose title contains `keyword`, ignoring case
///
/// Matches come back in ascending position order. A blank keyword matches
/// nothing.
pub fn match_keyword(records: &[ArticleRecord], keyword: &str) -> Vec<KeywordMatch> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.title.to_lowercase().contains(&needle))
        .map(|(idx, record)| KeywordMatch {
            position: idx + 1,
            title: record.title.clone(),
        })
        .collect()
}

/// Run [`match_keyword`] for each vocabulary term, keeping terms that hit
pub fn scan_vocabulary<S: AsRef<str>>(
    records: &[ArticleRecord],
    vocabulary: &[S],
) -> Vec<(String, Vec<KeywordMatch>)> {
    vocabulary
        .iter()
        .map(|term| (term.as_ref().to_string(), match_keyword(records, term.as_ref())))
        .filter(|(_, matches)| !matches.is_empty())
        .collect()
}
