//! Docseek CLI - Command-line interface for local semantic document search

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use docseek::config::{self, DocseekConfig};
use docseek::query::{Embedder, EmbeddingEngine, SearchEngine, SearchOptions, SearchResult};
use docseek::storage::SentenceStore;
use docseek::ui::{self, Icons, ProgressManager, Spinner};
use docseek::{DocumentExtractor, IngestOptions, IngestStats};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docseek")]
#[command(version)]
#[command(about = "Local semantic document search")]
#[command(long_about = r#"
Docseek splits a folder of documents into sentences, embeds them with a
local model and stores them in SQLite, so you can later find the files
whose sentences best match a free-text query.

Example usage:
  docseek index --path ./docs
  docseek search --query "animals that like to sleep"
  docseek interactive --path ./docs
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Clear the store and index a folder of documents
    Index {
        /// Folder to scan for documents
        #[arg(short, long)]
        path: PathBuf,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Sentences per embedding call
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Find the documents most similar to a query
    Search {
        /// Search query
        #[arg(short, long)]
        query: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only return sentences closer than this cosine distance
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Index a folder, then answer queries typed on stdin
    Interactive {
        /// Folder to scan (prompted for when omitted)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show statistics about the store
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Delete every stored sentence
    Clear {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &DocseekConfig::with_defaults(), force)?;
            ui::success(&format!("Wrote config to {}", path.display()));
        }

        Commands::Index { path, database, batch_size } => {
            let embedder = load_embedder(&cfg)?;
            let mut store = open_store(&cfg.database_path(database), embedder.dimension())?;

            ui::header(&format!("Indexing {}", path.display()));
            let options = IngestOptions {
                batch_size: batch_size.unwrap_or(cfg.ingest.batch_size),
            };
            index_folder(&path, &embedder, &mut store, &cfg, &options)?;

            let stats = store.stats()?;
            println!("{}", stats);
            store.close()?;
        }

        Commands::Search { query, database, limit, threshold, format } => {
            if query.trim().is_empty() {
                anyhow::bail!("query must not be empty");
            }
            let embedder = load_embedder(&cfg)?;
            let mut store = open_store(&cfg.database_path(database), embedder.dimension())?;
            let options = SearchOptions::new(
                limit.unwrap_or(cfg.search.limit),
                threshold.unwrap_or(cfg.search.distance_threshold),
            );

            let results = run_query(&store, &embedder, &query, &options)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    println!("{} Searching for: '{}'", Icons::SEARCH, query);
                    ui::search_results(&results);
                }
            }
            store.close()?;
        }

        Commands::Interactive { path, database } => {
            let folder = match path.or_else(|| cfg.path.as_ref().map(PathBuf::from)) {
                Some(folder) => folder,
                None => prompt_folder()?,
            };

            let embedder = load_embedder(&cfg)?;
            let mut store = open_store(&cfg.database_path(database), embedder.dimension())?;

            ui::header(&format!("Indexing {}", folder.display()));
            index_folder(&folder, &embedder, &mut store, &cfg, &cfg.ingest)?;
            query_loop(&store, &embedder, &cfg.search)?;

            store.close()?;
            ui::success("Application closed. Goodbye!");
        }

        Commands::Stats { database } => {
            let db_path = cfg.database_path(database);
            let mut store = open_store(&db_path, store_dimension(&cfg)?)?;
            let stats = store.stats()?;

            println!("{}", ui::store_table(&db_path, &stats, cfg.model_name()));
            store.close()?;
        }

        Commands::Clear { database } => {
            let mut store = open_store(&cfg.database_path(database), store_dimension(&cfg)?)?;
            store.clear()?;
            store.close()?;
            ui::success("Database cleared.");
        }
    }

    Ok(())
}

fn load_embedder(cfg: &DocseekConfig) -> anyhow::Result<EmbeddingEngine> {
    let spinner = Spinner::new(&format!("{} Loading embedding model {}", Icons::BRAIN, cfg.model_name()));
    match EmbeddingEngine::with_model(cfg.model_name()) {
        Ok(engine) => {
            spinner.finish_and_clear();
            Ok(engine)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

/// Embedding dimension for commands that never embed anything
fn store_dimension(cfg: &DocseekConfig) -> anyhow::Result<usize> {
    match EmbeddingEngine::known_dimension(cfg.model_name()) {
        Some(dim) => Ok(dim),
        None => Ok(load_embedder(cfg)?.dimension()),
    }
}

fn open_store(db_path: &Path, dim: usize) -> anyhow::Result<SentenceStore> {
    config::ensure_db_dir(db_path)?;
    tracing::debug!("Using database {}", db_path.display());
    Ok(SentenceStore::open(db_path, dim)?)
}

fn index_folder(
    folder: &Path,
    embedder: &EmbeddingEngine,
    store: &mut SentenceStore,
    cfg: &DocseekConfig,
    options: &IngestOptions,
) -> anyhow::Result<IngestStats> {
    let started = Instant::now();
    let extractor = DocumentExtractor::new().with_min_sentence_length(cfg.min_sentence_length());
    let (progress, tx) = ProgressManager::new();

    let stats = match docseek::reindex_folder(folder, &extractor, embedder, store, options, Some(&tx)) {
        Ok(stats) => stats,
        Err(e) => {
            progress.clear();
            return Err(e.into());
        }
    };

    if stats.sentences == 0 {
        progress.clear();
        ui::warn("No files found or processed in the folder.");
    } else {
        progress.finish_with_summary(started.elapsed(), stats.sources, stats.sentences);
    }
    Ok(stats)
}

fn run_query(
    store: &SentenceStore,
    embedder: &dyn Embedder,
    query: &str,
    options: &SearchOptions,
) -> anyhow::Result<Vec<SearchResult>> {
    let query_vector = embedder.embed_one(query)?;
    Ok(SearchEngine::new(store).search(&query_vector, options)?)
}

fn query_loop(store: &SentenceStore, embedder: &dyn Embedder, options: &SearchOptions) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nEnter your search query (or 'q' to quit): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let query = line?.trim().to_lowercase();
        if query.is_empty() {
            continue;
        }
        if matches!(query.as_str(), "q" | "quit" | "exit") {
            break;
        }

        println!("{} Searching for content related to: '{}'", Icons::SEARCH, query);
        match run_query(store, embedder, &query, options) {
            Ok(results) => ui::search_results(&results),
            Err(e) => ui::error(&format!("Could not run this query: {}", e)),
        }
    }

    Ok(())
}

fn prompt_folder() -> anyhow::Result<PathBuf> {
    println!("Enter the folder path to scan for files.");
    print!("Folder path: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let folder = line.trim();
    if folder.is_empty() {
        anyhow::bail!("no folder path given");
    }
    Ok(std::path::absolute(folder)?)
}
