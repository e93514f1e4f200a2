use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use litsearch::aggregator::Aggregator;
use litsearch::config::{
    find_config_file, load_config, Config, LogFormat, LoggingConfig, CONFIG_FILE_NAME,
};
use litsearch::models::{ArticleRecord, SourceType, UnknownSource};
use litsearch::sources::SourceRegistry;
use litsearch::ui::{self, Status};
use litsearch::utils::{match_keyword, scan_vocabulary, HttpClient, QueryCache};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// litsearch - Search bibliographic sources and cache the results per query
#[derive(Parser, Debug)]
#[command(name = "litsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search arXiv, PubMed, CrossRef, Google Scholar and DOAJ from one prompt", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Neither read nor write the query cache file
    #[arg(long, global = true, default_value_t = false)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Table on a terminal, JSON otherwise
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Numbered plain text
    Plain,
}

/// One source or every registered source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceSelector {
    All,
    One(SourceType),
}

impl FromStr for SourceSelector {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SourceSelector::All)
        } else {
            s.parse().map(SourceSelector::One)
        }
    }
}

impl SourceSelector {
    fn sources(&self, registry: &SourceRegistry) -> Vec<SourceType> {
        match self {
            SourceSelector::All => registry.types().collect(),
            SourceSelector::One(source) => vec![*source],
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search one source (or all) for a query
    #[command(alias = "s")]
    Search {
        /// Search query, used verbatim as part of the cache key
        query: String,

        /// Source id (arxiv, pubmed, crossref, google_scholar, doaj) or "all"
        #[arg(long, short, default_value = "all")]
        source: SourceSelector,

        /// Maximum number of results per source (default from config)
        #[arg(long, short)]
        limit: Option<usize>,

        /// Print the results whose title contains this keyword
        #[arg(long, short)]
        keyword: Option<String>,
    },

    /// Prompt for source, query, limit and keyword in a loop (default)
    #[command(alias = "i")]
    Interactive,

    /// List available sources
    Sources,

    /// Manage the query cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Write the default configuration file
    InitConfig {
        /// Where to write (default: <config dir>/litsearch/config.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    /// Show cache location and size
    Status,
    /// Remove every cached query
    Clear,
}

/// Settings shared by the search paths
struct Session {
    output: OutputFormat,
    quiet: bool,
    default_limit: usize,
    keywords: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })?;

    init_tracing(cli.verbose, cli.quiet, &config.logging);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    let session = Session {
        output: cli.output,
        quiet: cli.quiet,
        default_limit: config.search.default_limit,
        keywords: config.search.keywords.clone(),
    };

    match cli.command.take().unwrap_or(Commands::Interactive) {
        Commands::Search {
            query,
            source,
            limit,
            keyword,
        } => {
            let mut aggregator = build_aggregator(&config, cli.no_cache)?;
            let limit = limit.unwrap_or(session.default_limit);
            let records = resolve_selection(&mut aggregator, source, &query, limit, &session).await?;

            output_records(&records, session.output)?;

            if let Some(keyword) = keyword {
                let matches = match_keyword(&records, &keyword);
                print!("{}", ui::format_matches(&keyword, &matches));
            }
        }

        Commands::Interactive => {
            let mut aggregator = build_aggregator(&config, cli.no_cache)?;
            let stdin = std::io::stdin();
            run_interactive(&mut aggregator, &session, stdin.lock()).await?;
        }

        Commands::Sources => {
            let registry = SourceRegistry::new(Arc::new(HttpClient::from_config(&config.http)?));
            if session.output == OutputFormat::Json {
                let ids: Vec<_> = registry.types().map(|s| s.id()).collect();
                println!("{}", serde_json::to_string_pretty(&ids)?);
            } else {
                print!("{}", ui::format_sources(registry.types()));
            }
        }

        Commands::Cache { command } => {
            let mut cache = QueryCache::load(config.cache.resolved_path());

            match command {
                CacheCommands::Status => {
                    if !config.cache.enabled {
                        ui::print_status(Status::Warning, "Caching is disabled in configuration");
                    }
                    let stats = cache.stats();
                    if session.output == OutputFormat::Json {
                        println!("{}", serde_json::to_string_pretty(&stats)?);
                    } else {
                        print!("{}", ui::format_cache_stats(&stats));
                    }
                }
                CacheCommands::Clear => {
                    let count = cache.len();
                    cache.clear()?;
                    if !session.quiet {
                        ui::print_status(
                            Status::Success,
                            &format!("Removed {} cached queries", count),
                        );
                    }
                }
            }
        }

        Commands::InitConfig { path, force } => {
            let path = path.unwrap_or_else(default_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            if !session.quiet {
                ui::print_status(
                    Status::Success,
                    &format!("Wrote default configuration to {}", path.display()),
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool, logging: &LoggingConfig) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("litsearch={}", level)));
    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("litsearch").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn open_cache(config: &Config, no_cache: bool) -> QueryCache {
    if no_cache || !config.cache.enabled {
        tracing::debug!("Query cache file disabled, caching in memory only");
        QueryCache::in_memory()
    } else {
        QueryCache::load(config.cache.resolved_path())
    }
}

fn build_aggregator(config: &Config, no_cache: bool) -> Result<Aggregator> {
    let client = Arc::new(HttpClient::from_config(&config.http)?);
    Ok(Aggregator::new(
        SourceRegistry::new(client),
        open_cache(config, no_cache),
    ))
}

/// Resolve `query` against each selected source in turn
async fn resolve_selection(
    aggregator: &mut Aggregator,
    selector: SourceSelector,
    query: &str,
    limit: usize,
    session: &Session,
) -> Result<Vec<ArticleRecord>> {
    let mut records = Vec::new();

    for source in selector.sources(aggregator.registry()) {
        let resolution = aggregator.resolve(source, query, limit).await?;
        if !session.quiet {
            ui::print_resolution_status(&resolution);
        }
        records.extend(resolution.records);
    }

    Ok(records)
}

fn output_records(records: &[ArticleRecord], format: OutputFormat) -> Result<()> {
    let format = match format {
        OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => print!("{}", ui::format_plain(records)),
        OutputFormat::Table if records.is_empty() => println!("No results."),
        OutputFormat::Table | OutputFormat::Auto => {
            ui::print_section("Search Results");
            println!("{}", ui::records_table(records));
        }
    }

    Ok(())
}

/// Print `label` and read one trimmed line; `None` at end of input
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_exit(text: &str) -> bool {
    text.eq_ignore_ascii_case("exit")
}

async fn run_interactive<R: BufRead>(
    aggregator: &mut Aggregator,
    session: &Session,
    mut input: R,
) -> Result<()> {
    let source_ids: Vec<_> = aggregator.registry().types().map(|s| s.id()).collect();
    let source_label = format!(
        "Source ({}, all; 'exit' to quit): ",
        source_ids.join(", ")
    );
    let keyword_label = format!(
        "Keyword (blank scans: {}): ",
        session.keywords.join(", ")
    );

    loop {
        let Some(source_text) = prompt(&mut input, &source_label)? else {
            break;
        };
        if is_exit(&source_text) {
            break;
        }
        let selector = match source_text.parse::<SourceSelector>() {
            Ok(selector) => selector,
            Err(e) => {
                ui::print_status(Status::Warning, &e.to_string());
                continue;
            }
        };

        let Some(query) = prompt(&mut input, "Query: ")? else {
            break;
        };
        if is_exit(&query) {
            break;
        }
        if query.is_empty() {
            ui::print_status(Status::Warning, "Please enter a search query");
            continue;
        }

        let limit_label = format!("Limit [{}]: ", session.default_limit);
        let limit = loop {
            let Some(text) = prompt(&mut input, &limit_label)? else {
                return Ok(());
            };
            if text.is_empty() {
                break session.default_limit;
            }
            match text.parse::<usize>() {
                Ok(limit) => break limit,
                Err(_) => ui::print_status(
                    Status::Warning,
                    &format!("'{}' is not a whole number, try again", text),
                ),
            }
        };

        let records = resolve_selection(aggregator, selector, &query, limit, session).await?;
        output_records(&records, session.output)?;

        let Some(keyword) = prompt(&mut input, &keyword_label)? else {
            break;
        };
        if is_exit(&keyword) {
            break;
        }
        if keyword.is_empty() {
            let hits = scan_vocabulary(&records, &session.keywords);
            if hits.is_empty() {
                println!("No titles matched the keyword vocabulary");
            }
            for (term, matches) in hits {
                print!("{}", ui::format_matches(&term, &matches));
            }
        } else {
            print!(
                "{}",
                ui::format_matches(&keyword, &match_keyword(&records, &keyword))
            );
        }
    }

    Ok(())
}
