use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gutenshelf_catalog::GutendexSource;
use gutenshelf_core::models::language::is_supported;
use gutenshelf_core::{
    AppConfig, Author, Book, BookIngestor, CatalogQueryService, DEFAULT_TOP_BOOKS, Database, ExitCode,
    GutenshelfError, IngestOutcome, Language,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "gutenshelf",
    about = "Local catalog of Project Gutenberg books and authors",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format.
    /// Also enabled by setting GUTENSHELF_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look a title up on Gutendex and add the best match to the catalog.
    Search { title: String },

    /// List cataloged books, newest first.
    Books {
        /// Only books in this language (en, es, fr, pt).
        #[arg(long)]
        language: Option<String>,
    },

    /// List cataloged authors with their most downloaded books.
    Authors,

    /// List authors alive in the given year.
    Alive {
        #[arg(allow_negative_numbers = true)]
        year: i32,
    },

    /// Show catalog statistics.
    Stats,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information.
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Print the config file path.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("GUTENSHELF_JSON").as_deref() == Ok("1");

    if let Err(err) = run(cli.command, json_output).await {
        let code = err
            .downcast_ref::<GutenshelfError>()
            .map(GutenshelfError::exit_code)
            .unwrap_or(ExitCode::GeneralError);
        report_error(&err, code, json_output);
        std::process::exit(code as i32);
    }
}

async fn run(command: Option<Commands>, json_output: bool) -> Result<()> {
    let start = Instant::now();

    let mut config = AppConfig::load()?;
    if let Ok(data_dir) = std::env::var("GUTENSHELF_DATA_DIR") {
        config.set_data_dir(data_dir);
    }
    debug!(config = %AppConfig::config_path().display(), db = %config.database_path().display(), "config loaded");

    match command {
        None => {
            Cli::command().print_help()?;
        }

        // ── Search ─────────────────────────────────────────────────────────

        Some(Commands::Search { title }) => {
            let db = open_db(&config)?;
            let catalog = GutendexSource::new(&config.catalog)?;
            let outcome = BookIngestor::new(&db, &catalog).ingest_detailed(&title).await?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "book": outcome.book(), "created": outcome.is_new() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                match &outcome {
                    IngestOutcome::Created(_) => println!("Added to catalog:"),
                    IngestOutcome::AlreadyCataloged(_) => println!("Already in catalog:"),
                }
                print_book(outcome.book());
            }
        }

        // ── Books ──────────────────────────────────────────────────────────

        Some(Commands::Books { language }) => {
            let filter = match language.as_deref() {
                Some(code) if !is_supported(code) => {
                    let message = format!("unsupported language code: {code} (expected en, es, fr or pt)");
                    report_message(&message, ExitCode::InvalidArgs, json_output);
                    std::process::exit(ExitCode::InvalidArgs as i32);
                }
                Some(code) => Some(code.parse::<Language>().map_err(anyhow::Error::msg)?),
                None => None,
            };

            let db = open_db(&config)?;
            let queries = CatalogQueryService::new(&db);
            let books = match filter {
                Some(lang) => queries.list_books_by_language(lang)?,
                None => queries.list_all_books()?,
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": books, "total": books.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if books.is_empty() {
                match filter {
                    Some(lang) => println!("No books in {}.", lang.display_name()),
                    None => println!("No books cataloged. Use `gutenshelf search <title>` to add one."),
                }
            } else {
                for book in &books {
                    print_book(book);
                }
            }
        }

        // ── Authors ────────────────────────────────────────────────────────

        Some(Commands::Authors) => {
            let db = open_db(&config)?;
            let queries = CatalogQueryService::new(&db);
            let authors = queries.list_all_authors()?;

            let mut items = Vec::with_capacity(authors.len());
            for author in &authors {
                let top = queries.top_books_by_author(author.id, DEFAULT_TOP_BOOKS)?;
                items.push((author, top));
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                let data: Vec<serde_json::Value> = items
                    .iter()
                    .map(|(author, top)| serde_json::json!({ "author": author, "top_books": top }))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": data, "total": authors.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if items.is_empty() {
                println!("No authors cataloged.");
            } else {
                for (author, top) in &items {
                    for line in author_with_top_books(author, top) {
                        println!("{line}");
                    }
                    println!();
                }
            }
        }

        // ── Alive ──────────────────────────────────────────────────────────

        Some(Commands::Alive { year }) => {
            let db = open_db(&config)?;
            let authors = CatalogQueryService::new(&db).list_authors_alive_in_year(year)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": authors, "total": authors.len(), "year": year },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if authors.is_empty() {
                println!("No cataloged authors were alive in {year}.");
            } else {
                for author in &authors {
                    for line in author_lines(author) {
                        println!("{line}");
                    }
                    println!("  Books: {}", book_titles(author));
                    println!();
                }
            }
        }

        // ── Stats ──────────────────────────────────────────────────────────

        Some(Commands::Stats) => {
            let db = open_db(&config)?;
            let stats = CatalogQueryService::new(&db).stats()?;
            let dur = start.elapsed().as_millis();

            if json_output {
                let by_language: BTreeMap<&str, usize> = stats
                    .books_by_language
                    .iter()
                    .map(|(lang, count)| (lang.code(), *count))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "total_books": stats.total_books,
                        "total_authors": stats.total_authors,
                        "books_by_language": by_language
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Catalog statistics:");
                println!("  Total books:   {}", stats.total_books);
                println!("  Total authors: {}", stats.total_authors);
                for (lang, count) in &stats.books_by_language {
                    println!("  {:<15} {count}", lang.display_name());
                }
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Some(Commands::Config { action }) => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv = config_key_values(&config);
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Path => {
                    let path = AppConfig::config_path();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"path":path},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{}", path.display());
                    }
                }
            }
        }

        // ── Version ────────────────────────────────────────────────────────

        Some(Commands::Version) => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("gutenshelf v{version}");
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn report_error(err: &anyhow::Error, code: ExitCode, json_output: bool) {
    report_message(&format!("{err:#}"), code, json_output);
}

fn report_message(message: &str, code: ExitCode, json_output: bool) {
    if json_output {
        let kind = match code {
            ExitCode::NotFound => "not_found",
            ExitCode::InvalidArgs => "invalid_args",
            ExitCode::NetworkError => "network_error",
            ExitCode::FileSystemError => "filesystem_error",
            _ => "error",
        };
        println!("{}", serde_json::json!({"status":"error","error":kind,"message":message}));
    } else {
        eprintln!("Error: {message}");
    }
}

fn open_db(config: &AppConfig) -> Result<Database> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Database::open(&db_path)?)
}

fn print_book(book: &Book) {
    let authors = if book.authors().is_empty() {
        "unknown".to_string()
    } else {
        book.authors()
            .iter()
            .map(|a| a.display_name())
            .collect::<Vec<_>>()
            .join("; ")
    };

    println!("----- BOOK -----");
    println!("Title:     {}", book.title);
    println!("Author(s): {authors}");
    println!("Language:  {}", book.language.display_name());
    println!("Downloads: {}", book.download_count);
    println!("----------------");
}

fn author_lines(author: &Author) -> Vec<String> {
    vec![
        format!("Author: {}", author.display_name()),
        format!("  Born:  {}", author.birth_label()),
        format!("  Died:  {}", author.death_label()),
    ]
}

/// Author header followed by the given books only, not the full bibliography.
fn author_with_top_books(author: &Author, top: &[Book]) -> Vec<String> {
    let mut lines = author_lines(author);
    lines.push("  Top books:".to_string());
    lines.extend(
        top.iter()
            .map(|book| format!("    {} ({} downloads)", book.title, book.download_count)),
    );
    lines
}

fn book_titles(author: &Author) -> String {
    author
        .books()
        .iter()
        .map(|b| b.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn config_key_values(config: &AppConfig) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    map.insert("config_path", AppConfig::config_path().to_string_lossy().to_string());
    map.insert("core.data_dir", config.core.data_dir.clone());
    map.insert("database_path", config.database_path().to_string_lossy().to_string());
    map.insert("catalog.base_url", config.catalog.base_url.clone());
    map.insert("catalog.timeout_secs", config.catalog.timeout_secs.to_string());
    map.insert("catalog.user_agent", config.catalog.user_agent.clone());
    map
}
