//! mussala CLI - inspect the marker catalog and replay location tracks

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use mussala::{
    AppConfig, CameraPosition, ConfigurationManager, FixOptions, GeoFix, LocationTracker,
    MarkerCatalog, MarkerCategory, NearestStrategy, ReplayProvider,
};

#[derive(Parser)]
#[command(name = "mussala")]
#[command(author, version, about = "Mosque and prayer room map core", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory holding markers.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every marker view as JSON
    Markers {
        /// Only markers of this category (name or numeric code)
        #[arg(long)]
        category: Option<String>,
    },
    /// Nearest site of a category
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value = "mosque")]
        category: String,
        /// Rank loaded records by distance instead of the configured strategy
        #[arg(long)]
        by_distance: bool,
    },
    /// Great-circle distance between two points, in meters
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lon1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lon2: f64,
    },
    /// Track a recorded route and print each fix
    Track {
        /// JSON array of fixes
        #[arg(long)]
        replay: PathBuf,
        /// Delay between replayed fixes (ms)
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
        /// Stop after this many fixes
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).try_init();

    match cli.command {
        Commands::Markers { category } => {
            let catalog = MarkerCatalog::from_config(&config).context("failed to load marker catalog")?;
            let filter = category.as_deref().map(parse_category).transpose()?;

            let views: Vec<_> = catalog
                .all_marker_views()
                .into_iter()
                .filter(|view| filter.map_or(true, |c| view.record.category == c))
                .collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Commands::Nearest { lat, lon, category, by_distance } => {
            let mut config = config;
            if by_distance {
                config.nearest = NearestStrategy::ByDistance;
            }
            let catalog = MarkerCatalog::from_config(&config).context("failed to load marker catalog")?;
            let category = parse_category(&category)?;
            let origin = GeoFix::new(lat, lon);
            if !origin.is_valid() {
                bail!("coordinates out of range: {}, {}", lat, lon);
            }

            match catalog.find_nearest_of_category(&origin, category) {
                Some(site) => {
                    let meters = mussala::haversine_distance(&origin, &site);
                    println!("{:.7}, {:.7} ({:.0} m)", site.latitude, site.longitude, meters);
                }
                None => println!("no {} found", category),
            }
        }
        Commands::Distance { lat1, lon1, lat2, lon2 } => {
            let meters = mussala::haversine_distance(&GeoFix::new(lat1, lon1), &GeoFix::new(lat2, lon2));
            println!("{:.1}", meters);
        }
        Commands::Track { replay, interval_ms, count } => {
            let interval = Duration::from_millis(interval_ms);
            let provider = ReplayProvider::from_file(&replay, interval)
                .with_context(|| format!("failed to load track {}", replay.display()))?;
            let limit = count.unwrap_or_else(|| provider.track_len());

            let tracker = LocationTracker::new(Arc::new(provider), config.tracker.clone(), config.debug);

            let first = tracker
                .current_fix(Some(FixOptions::default().with_timeout_ms(interval_ms * 4 + 1000)))
                .context("no initial fix")?;
            let camera = CameraPosition::centered_on(&first);
            info!(lat = camera.latitude, lon = camera.longitude, zoom = camera.zoom, "camera centered");

            let updates = tracker.location_updates();
            if tracker.start().is_none() {
                bail!("location tracking could not start");
            }

            let mut printed = 0;
            while printed < limit {
                match updates.recv_timeout(interval * 4) {
                    Some(fix) => {
                        println!("{}", serde_json::to_string(&fix)?);
                        printed += 1;
                    }
                    None => break,
                }
            }
            tracker.dispose();
            info!(fixes = printed, "tracking finished");
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigurationManager::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .config()
            .clone(),
        None => AppConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    config.debug |= cli.debug;
    Ok(config)
}

fn parse_category(name: &str) -> Result<MarkerCategory> {
    match MarkerCategory::from_name(name) {
        Some(category) => Ok(category),
        None => bail!("unknown marker category '{}'", name),
    }
}
