use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use stocklens::{
    artifact_cache::{BoundedArtifactCache, CacheSettings, FileStore},
    capture::{CaptureSource, LineCaptureSource},
    config::Config,
    errors::AppError,
    ingestor::CsvLoader,
    labels::render_label,
    render::{CachedRenderer, Code39SvgRenderer},
    state::AppState,
};

#[derive(Parser)]
#[command(name = "stocklens")]
#[command(version = "0.1.0")]
#[command(about = "Client-side inventory lookup with code generation and label printing")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a spreadsheet and list (optionally filtered) records
    List {
        /// Stock spreadsheet (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Query string; supports '%' as a wildcard
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Resolve a code (e.g. from an external scan) to its record
    Lookup {
        #[arg(short, long)]
        file: PathBuf,

        code: String,
    },

    /// Write a print-ready label for one item
    Label {
        #[arg(short, long)]
        file: PathBuf,

        code: String,

        /// Output path for the label document (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop all cached artifacts before rendering
        #[arg(long)]
        refresh_cache: bool,
    },

    /// Read scanned codes from a capture source and resolve each one
    Scan {
        #[arg(short, long)]
        file: PathBuf,

        /// File of decoded codes, one per line (stdin if omitted)
        #[arg(long)]
        codes: Option<PathBuf>,
    },

    /// Show artifact cache statistics
    CacheStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("stocklens={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from specified file
    std::env::set_var("STOCKLENS_CONFIG", &cli.config);
    let config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    match cli.command {
        Command::List { file, query } => list(&config, &file, query.as_deref()),
        Command::Lookup { file, code } => lookup(&config, &file, &code),
        Command::Label {
            file,
            code,
            output,
            refresh_cache,
        } => label(&config, &file, &code, output, refresh_cache),
        Command::Scan { file, codes } => scan(&config, &file, codes).await,
        Command::CacheStats => cache_stats(&config),
    }
}

fn load_state(config: &Config, file: &PathBuf) -> Result<AppState> {
    let loader = CsvLoader::new(config.ingestion.delimiter);
    let reader = std::fs::File::open(file).map_err(AppError::Io)?;
    let (records, summary) = loader
        .load(reader, &file.to_string_lossy())
        .map_err(AppError::Ingest)?;
    info!(
        "Loaded {} records ({} rows skipped)",
        summary.loaded, summary.skipped
    );

    let mut state = AppState::new();
    state.set_records(records);
    Ok(state)
}

fn open_cached_renderer(
    config: &Config,
) -> Result<CachedRenderer<Code39SvgRenderer, FileStore>> {
    let store = FileStore::open(config.storage.cache_path.clone()).map_err(AppError::Storage)?;
    let settings = CacheSettings {
        budget_bytes: config.storage.cache_budget_bytes,
        entry_ceiling_bytes: config.storage.cache_entry_ceiling_bytes,
        ..CacheSettings::default()
    };
    let mut cache = BoundedArtifactCache::new(store, settings);
    cache.evict_older_than(chrono::Duration::seconds(
        config.storage.cache_max_age_secs as i64,
    ));
    Ok(CachedRenderer::new(Code39SvgRenderer::default(), cache))
}

fn print_record(record: &stocklens::models::StockRecord, flag_negative: bool) {
    let flag = if flag_negative && record.available() < 0 {
        " !"
    } else {
        ""
    };
    println!(
        "{:<16} {:<32} on-hand {:>6}  reserved {:>6}  available {:>6}{}",
        record.code,
        record.display_name(),
        record.quantity_on_hand,
        record.reserved,
        record.available(),
        flag
    );
}

fn list(config: &Config, file: &PathBuf, query: Option<&str>) -> Result<()> {
    let mut state = load_state(config, file)?;
    if let Some(query) = query {
        state.set_query(query);
    }
    for record in state.view() {
        print_record(record, config.ingestion.flag_negative_available);
    }
    info!("{} of {} records shown", state.view().len(), state.records().len());
    Ok(())
}

fn lookup(config: &Config, file: &PathBuf, code: &str) -> Result<()> {
    let mut state = load_state(config, file)?;
    match state.select_code(code) {
        Some(record) => {
            print_record(record, config.ingestion.flag_negative_available);
            Ok(())
        }
        None => {
            // A normal negative result, not a fault
            println!("Product with code \"{}\" not found in inventory.", code);
            Ok(())
        }
    }
}

fn label(
    config: &Config,
    file: &PathBuf,
    code: &str,
    output: Option<PathBuf>,
    refresh_cache: bool,
) -> Result<()> {
    let mut state = load_state(config, file)?;
    let Some(record) = state.select_code(code).cloned() else {
        println!("Product with code \"{}\" not found in inventory.", code);
        return Ok(());
    };

    let mut renderer = open_cached_renderer(config)?;
    if refresh_cache {
        renderer.invalidate_all();
    }
    let markup = renderer.markup_for(&record.code);
    let document = render_label(&record, &markup, &config.labels);

    match output {
        Some(path) => {
            std::fs::write(&path, document)?;
            info!("Label for {} written to {:?}", record.code, path);
        }
        None => print!("{}", document),
    }
    Ok(())
}

async fn scan(config: &Config, file: &PathBuf, codes: Option<PathBuf>) -> Result<()> {
    let mut state = load_state(config, file)?;

    let mut source = match codes {
        Some(path) => LineCaptureSource::File(path),
        None => LineCaptureSource::Stdin,
    };
    let mut handle = match source.acquire().await {
        Ok(handle) => handle,
        Err(e) => {
            // Degrade to "feature unavailable" rather than aborting
            warn!("Scan capture unavailable: {}", e);
            return Ok(());
        }
    };

    info!("Scanning from {}", handle.source_name());
    while let Some(code) = handle.next_code().await {
        match state.select_code(&code) {
            Some(record) => print_record(record, config.ingestion.flag_negative_available),
            None => println!("Product with code \"{}\" not found in inventory.", code),
        }
    }
    Ok(())
}

fn cache_stats(config: &Config) -> Result<()> {
    let store = FileStore::open(config.storage.cache_path.clone())?;
    let settings = CacheSettings {
        budget_bytes: config.storage.cache_budget_bytes,
        entry_ceiling_bytes: config.storage.cache_entry_ceiling_bytes,
        ..CacheSettings::default()
    };
    let cache = BoundedArtifactCache::new(store, settings);
    println!(
        "entries: {}  size: {} / {} bytes  enabled: {}",
        cache.entry_count(),
        cache.current_size(),
        config.storage.cache_budget_bytes,
        cache.is_enabled()
    );
    Ok(())
}
