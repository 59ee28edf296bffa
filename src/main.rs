use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use log::error;
use url::Url;

mod db;
mod domain;
mod errors;
mod geos;
mod logger;
mod scraper;
mod spreadsheets;

#[cfg(test)]
mod tests;

use crate::db::CatalogStore;
use crate::domain::ryokan::Ryokan;
use crate::errors::PipelineError;
use crate::geos::{geocode_catalog, GeocodeResolver};
use crate::scraper::{run_scrape, RyokanScraper, ScrapeOptions, BASE_URL, DEFAULT_TOTAL_PAGES};
use crate::spreadsheets::export_catalog_xlsx;

#[derive(Parser)]
#[command(
    name = "ryokan_explorer",
    about = "Builds a ryokan catalog from the listing directory and resolves GPS coordinates"
)]
struct Cli {
    /// Catalog file every stage reads and writes
    #[arg(long, default_value = "ryokans_db.csv", global = true)]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the listing directory and build/refresh the catalog
    Scrape(ScrapeArgs),
    /// Resolve coordinates for catalog records that lack them
    Geocode,
    /// Scrape, then geocode, in one process
    Run(ScrapeArgs),
    /// Export the catalog to an .xlsx spreadsheet
    Export {
        #[arg(long, default_value = "ryokans_db.xlsx")]
        xlsx: PathBuf,
    },
}

#[derive(Args)]
struct ScrapeArgs {
    /// Number of index pages to walk
    #[arg(long, default_value_t = DEFAULT_TOTAL_PAGES)]
    pages: u32,

    /// Politeness delay bounds between listing fetches
    #[arg(long, default_value_t = 500)]
    min_delay_ms: u64,
    #[arg(long, default_value_t = 1000)]
    max_delay_ms: u64,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::setup_logger() {
        eprintln!("Logger init failed: {e}");
        process::exit(1);
    }

    if let Err(e) = run(cli) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let store = CatalogStore::new(&cli.out);

    // A SIGINT only flips this flag; both stages poll it between units of
    // work and checkpoint before returning, so interrupting is always safe.
    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))
        .map_err(|e| PipelineError::Init(format!("install SIGINT handler: {e}")))?;

    match cli.command {
        Command::Scrape(args) => {
            scrape_stage(&store, &args, &stop)?;
        }
        Command::Geocode => {
            geocode_stage(&store, &stop)?;
        }
        Command::Run(args) => {
            scrape_stage(&store, &args, &stop)?;
            geocode_stage(&store, &stop)?;
        }
        Command::Export { xlsx } => {
            let records = store.load()?;
            export_catalog_xlsx(&records, &xlsx)?;
            println!("Exported {} records to {}", records.len(), xlsx.display());
        }
    }

    Ok(())
}

fn scrape_stage(
    store: &CatalogStore,
    args: &ScrapeArgs,
    stop: &AtomicBool,
) -> Result<Vec<Ryokan>, PipelineError> {
    let scraper = RyokanScraper::new()?;
    let base: Url = BASE_URL.parse().unwrap();
    let opts = ScrapeOptions {
        total_pages: args.pages,
        min_delay_ms: args.min_delay_ms,
        max_delay_ms: args.max_delay_ms,
    };

    let catalog = run_scrape(&scraper, store, &base, &opts, stop)?;
    println!(
        "Done! {} ryokans in catalog. Saved to {}",
        catalog.len(),
        store.path().display()
    );
    Ok(catalog)
}

fn geocode_stage(store: &CatalogStore, stop: &AtomicBool) -> Result<(), PipelineError> {
    let mut records = store.load()?;
    if records.is_empty() {
        println!(
            "Catalog {} is empty. Run the scrape stage first.",
            store.path().display()
        );
        return Ok(());
    }

    let mut resolver = GeocodeResolver::osm_defaults()?;
    geocode_catalog(&mut records, &mut resolver, store, stop)?;

    let located = records.iter().filter(|r| r.has_coordinates()).count();
    println!("✅ Finished! {located}/{} ryokans located.", records.len());
    Ok(())
}
