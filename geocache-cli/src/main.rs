//! Geocache CLI
//!
//! Command-line interface for querying a places file through the caching geocoder.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use futures::future::join_all;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geocache_cache::CacheStats;
use geocache_core::traits::Geocoder;
use geocache_core::types::{Coordinate, Place};
use geocache_registry::{FileGeocoder, MemoryGeocoder};
use geocache_resolver::{CachingGeocoder, ResolverConfig};

/// Geocache - caching geocoder over a local places file
#[derive(Parser)]
#[command(name = "geocache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file of places to serve
    #[arg(short, long, global = true, env = "GEOCACHE_PLACES")]
    places: Option<PathBuf>,

    /// JSON resolver configuration; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Default locale for requests that do not name one
    #[arg(long, global = true, env = "GEOCACHE_LOCALE")]
    default_locale: Option<String>,

    /// Cache TTL, e.g. "24h" or "90s"
    #[arg(long, global = true, env = "GEOCACHE_TTL", value_parser = humantime::parse_duration)]
    ttl: Option<Duration>,

    /// Simulated provider latency, e.g. "200ms"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    latency: Option<Duration>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address to places
    Forward {
        /// Address to search for
        address: String,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Resolve a "lat,lon" coordinate to nearby places
    Reverse {
        /// Coordinate as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        coordinate: Coordinate,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Resolve a place id
    Lookup {
        /// Place id
        id: String,
        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Locale of the request, e.g. "de-AT"
    #[arg(short, long)]
    locale: Option<String>,

    /// Issue the request this many times concurrently and print cache statistics
    #[arg(short, long, default_value = "1")]
    repeat: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "geocache=debug,info"
    } else {
        "geocache=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(cli.config.as_deref(), cli.ttl, cli.default_locale.clone())?;
    let geocoder = build_geocoder(cli.places.as_deref(), cli.latency, config).await?;

    match cli.command {
        Commands::Forward { address, request } => cmd_forward(&geocoder, &address, &request).await,
        Commands::Reverse { coordinate, request } => cmd_reverse(&geocoder, coordinate, &request).await,
        Commands::Lookup { id, request } => cmd_lookup(&geocoder, &id, &request).await,
    }
}

/// Reads the optional config file and applies flag overrides.
fn load_config(path: Option<&Path>, ttl: Option<Duration>, default_locale: Option<String>) -> Result<ResolverConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => ResolverConfig::default(),
    };

    if let Some(ttl) = ttl {
        config.cache.ttl = ttl;
    }
    if default_locale.is_some() {
        config.default_locale = default_locale;
    }

    config.validate().context("Invalid resolver configuration")?;
    Ok(config)
}

async fn build_geocoder(
    places: Option<&Path>,
    latency: Option<Duration>,
    config: ResolverConfig,
) -> Result<CachingGeocoder> {
    let mut index = MemoryGeocoder::new();
    if let Some(latency) = latency {
        index = index.with_latency(latency);
    }

    let provider: Arc<dyn Geocoder> = match places {
        Some(path) => {
            let file = FileGeocoder::with_index(path, index)
                .await
                .context("Failed to load places file")?;
            debug!(count = file.len(), path = %path.display(), "Places loaded");
            Arc::new(file)
        }
        None => {
            println!(
                "{}",
                "⚠️  No places file given (use --places or GEOCACHE_PLACES); every search will be empty.".yellow()
            );
            Arc::new(index)
        }
    };

    CachingGeocoder::new(provider, config).context("Failed to create caching geocoder")
}

/// Resolve an address
async fn cmd_forward(geocoder: &CachingGeocoder, address: &str, request: &RequestArgs) -> Result<()> {
    println!("{} {}", "🔍 Geocoding:".cyan().bold(), address);

    let locale = request.locale.as_deref();
    let start = Instant::now();
    let results = join_all((0..request.repeat.max(1)).map(|_| geocoder.geocode(address, locale))).await;
    let elapsed = start.elapsed();

    let places = first_result(results).context("Geocoding failed")?;
    print_places(&places, request.json)?;
    print_stats(request, elapsed, &geocoder.stats().forward);
    Ok(())
}

/// Resolve a coordinate
async fn cmd_reverse(geocoder: &CachingGeocoder, coordinate: Coordinate, request: &RequestArgs) -> Result<()> {
    println!("{} {}", "📍 Reverse geocoding:".cyan().bold(), coordinate);

    let locale = request.locale.as_deref();
    let start = Instant::now();
    let results =
        join_all((0..request.repeat.max(1)).map(|_| geocoder.reverse_geocode(coordinate, locale))).await;
    let elapsed = start.elapsed();

    let places = first_result(results).context("Reverse geocoding failed")?;
    print_places(&places, request.json)?;
    print_stats(request, elapsed, &geocoder.stats().reverse);
    Ok(())
}

/// Resolve a place id
async fn cmd_lookup(geocoder: &CachingGeocoder, id: &str, request: &RequestArgs) -> Result<()> {
    println!("{} {}", "🔎 Looking up:".cyan().bold(), id);

    let locale = request.locale.as_deref();
    let start = Instant::now();
    let results = join_all((0..request.repeat.max(1)).map(|_| geocoder.lookup(id, locale))).await;
    let elapsed = start.elapsed();

    let place = first_result(results).context("Lookup failed")?;
    match place {
        Some(place) => print_places(std::slice::from_ref(&place), request.json)?,
        None => println!("\n{}", "No place with that id.".yellow()),
    }
    print_stats(request, elapsed, &geocoder.stats().lookup);
    Ok(())
}

/// Concurrent callers all see the same outcome; report the first.
fn first_result<T>(results: Vec<geocache_core::Result<T>>) -> Result<T> {
    match results.into_iter().next() {
        Some(result) => Ok(result?),
        None => anyhow::bail!("no request was made"),
    }
}

fn print_places(places: &[Place], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(places)?);
        return Ok(());
    }

    if places.is_empty() {
        println!("\n{}", "No places found.".yellow());
        return Ok(());
    }

    println!("\n{} {} place(s):", "✅".green(), places.len());
    for place in places {
        println!("   {} {}", "Id:".green(), place.id());
        if let Some(address) = place.address() {
            println!("      {} {}", "Address:".dimmed(), address);
        }
        if let Some(coordinate) = place.coordinate() {
            println!("      {} {}", "Coordinate:".dimmed(), coordinate);
        }
        for component in place.components() {
            println!("      {} {}", format!("{}:", component.kind()).dimmed(), component.text());
        }
    }
    Ok(())
}

fn print_stats(request: &RequestArgs, elapsed: Duration, stats: &CacheStats) {
    if request.repeat <= 1 {
        return;
    }

    println!("\n{}", "📈 Cache:".green().bold());
    println!("   Requests: {} in {:?}", request.repeat, elapsed);
    println!("   Upstream calls: {}", stats.misses);
    println!("   Shared in-flight: {}", stats.coalesced);
    println!("   Hits: {}", stats.hits);
}
