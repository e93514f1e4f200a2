//! Terminal rendering for records, keyword matches and status lines.
//!
//! Rendering functions return strings (or a `comfy_table::Table`) so the CLI
//! decides where they go; the `print_*` helpers write to stdout/stderr.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::fmt::Write as _;

use crate::aggregator::{Origin, Resolution};
use crate::models::{ArticleRecord, SourceType};
use crate::utils::{CacheStats, KeywordMatch};

/// Source icons for the supported sources.
pub fn source_icon(source: SourceType) -> &'static str {
    match source {
        SourceType::Arxiv => "📝",
        SourceType::PubMed => "🏥",
        SourceType::CrossRef => "🔗",
        SourceType::GoogleScholar => "🔎",
        SourceType::Doaj => "📓",
    }
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Print a styled status message to stderr, keeping stdout for results.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// Describe where a resolution came from and anything that went wrong.
pub fn print_resolution_status(resolution: &Resolution) {
    let source = resolution.key.source;
    match (&resolution.origin, &resolution.source_error) {
        (Origin::Cache, _) => print_status(
            Status::Info,
            &format!(
                "{} results for \"{}\" loaded from cache ({})",
                resolution.records.len(),
                resolution.key.query,
                source
            ),
        ),
        (Origin::Source, Some(e)) => {
            print_status(Status::Warning, &format!("{} returned no results: {}", source, e))
        }
        (Origin::Source, None) => print_status(
            Status::Search,
            &format!(
                "Found {} results from {} {}",
                resolution.records.len(),
                source_icon(source),
                source
            ),
        ),
    }

    if let Some(e) = &resolution.persist_error {
        print_status(
            Status::Error,
            &format!("Results were not saved to the cache: {}", e),
        );
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Truncate text to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return "...".to_string();
    }

    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Build a table of records.
pub fn records_table(records: &[ArticleRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Title", "Authors", "Year", "Source", "Link"]);

    for (idx, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(truncate_with_ellipsis(&record.title, 60)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&record.author_line(), 40)),
            Cell::new(record.year.as_str()),
            Cell::new(record.source.name()),
            Cell::new(&record.url),
        ]);
    }

    table
}

/// Plain numbered listing of records.
pub fn format_plain(records: &[ArticleRecord]) -> String {
    let mut out = String::new();
    for (idx, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, record.title);
        let _ = writeln!(out, "   Authors: {}", record.author_line());
        let _ = writeln!(out, "   Year: {}", record.year);
        let _ = writeln!(out, "   Link: {}", record.url);
        out.push('\n');
    }
    out
}

/// Render keyword matches as `position. title` lines.
pub fn format_matches(keyword: &str, matches: &[KeywordMatch]) -> String {
    if matches.is_empty() {
        return format!("No titles contain \"{}\"\n", keyword);
    }

    let mut out = format!("Titles containing \"{}\":\n", keyword);
    for m in matches {
        let _ = writeln!(out, "  {}. {}", m.position, m.title);
    }
    out
}

/// Render the list of available sources.
pub fn format_sources(sources: impl IntoIterator<Item = SourceType>) -> String {
    let mut out = String::new();
    for source in sources {
        let _ = writeln!(
            out,
            "{} {:<15} {:<15} {}",
            source_icon(source),
            source.id(),
            source.name(),
            source.site_url()
        );
    }
    out
}

/// Render cache statistics.
pub fn format_cache_stats(stats: &CacheStats) -> String {
    let mut out = String::new();
    match &stats.path {
        Some(path) => {
            let _ = writeln!(out, "Cache file: {}", path.display());
        }
        None => out.push_str("Cache file: none (in-memory)\n"),
    }
    let _ = writeln!(out, "Cached queries: {}", stats.entry_count);
    let _ = writeln!(out, "Queries with no results: {}", stats.empty_entry_count);
    let _ = writeln!(out, "Cached records: {}", stats.record_count);
    let size = stats
        .file_size_bytes
        .map(format_file_size)
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "File size: {}", size);
    out
}

/// Get a human-readable file size.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
