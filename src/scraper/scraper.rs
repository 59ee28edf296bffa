// scraper.rs
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use reqwest::blocking::Client;
use scraper::Html;
use url::Url;

use crate::db::CatalogStore;
use crate::domain::ryokan::Ryokan;
use crate::errors::PipelineError;
use crate::scraper::discover::discover_listings;
use crate::scraper::extract::{extract_listing, FragmentFetcher};
use crate::scraper::ScraperError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

pub const BASE_URL: &str = "https://selected-ryokan.com";
pub const DEFAULT_TOTAL_PAGES: u32 = 54;

const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
const WIDGET_TIMEOUT: Duration = Duration::from_secs(5);

/// Checkpoint cadence: a snapshot every few listings keeps the re-scrape
/// window small without hammering the disk.
const SAVE_EVERY_LISTINGS: usize = 5;

pub struct ScrapeOptions {
    pub total_pages: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

pub struct RyokanScraper {
    client: Client,
    widget_client: Client,
}

impl RyokanScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(PAGE_TIMEOUT)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        // Rating widgets get a much shorter leash than pages: a slow widget
        // degrades one field, never the listing.
        let widget_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(WIDGET_TIMEOUT)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            widget_client,
        })
    }

    pub fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status(status.as_u16(), url.to_string()));
        }

        response.text().map_err(|e| ScraperError::Network(e.to_string()))
    }

    /// Fetch one listing page and extract its record. Extraction itself
    /// cannot fail; only the fetch can.
    pub fn scrape_listing(&self, url: &str) -> Result<Ryokan, ScraperError> {
        let html = self.fetch_html(url)?;
        let doc = Html::parse_document(&html);
        Ok(extract_listing(&doc, url, self))
    }
}

impl FragmentFetcher for RyokanScraper {
    fn fetch_fragment(&self, url: &str) -> Option<String> {
        let response = self.widget_client.get(url).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().ok()
    }
}

/// Walks every index page, scrapes each newly discovered listing, and
/// checkpoints along the way. A failed page or listing is logged and
/// skipped; only an unrecoverable checkpoint write ends the run early.
/// `stop` is polled between units of work so an operator interrupt always
/// lands between listings, never inside one.
pub fn run_scrape(
    scraper: &RyokanScraper,
    store: &CatalogStore,
    base: &Url,
    opts: &ScrapeOptions,
    stop: &AtomicBool,
) -> Result<Vec<Ryokan>, PipelineError> {
    let mut catalog = store.load()?;
    let mut seen: HashSet<String> = catalog.iter().map(|r| r.url.clone()).collect();
    if !catalog.is_empty() {
        info!("resuming with {} existing records", catalog.len());
    }

    let mut new_records = 0usize;
    let mut since_save = 0usize;

    'pages: for page in 1..=opts.total_pages {
        if stop.load(Ordering::Relaxed) {
            info!("interrupt received, stopping before page {page}");
            break;
        }

        let page_url = format!("{BASE_URL}/ryokan/page/{page}");
        let html = match scraper.fetch_html(&page_url) {
            Ok(html) => html,
            Err(e) => {
                warn!("skipping index page {page}: {e}");
                continue;
            }
        };

        let doc = Html::parse_document(&html);
        let links = discover_listings(&doc, base);
        info!("page {page}/{}: {} listing links", opts.total_pages, links.len());

        for link in links {
            if stop.load(Ordering::Relaxed) {
                info!("interrupt received, stopping after {new_records} new records");
                break 'pages;
            }
            if seen.contains(&link) {
                debug!("already cataloged: {link}");
                continue;
            }

            match scraper.scrape_listing(&link) {
                Ok(record) => {
                    seen.insert(link);
                    catalog.push(record);
                    new_records += 1;
                    since_save += 1;
                }
                Err(e) => warn!("skipping listing {link}: {e}"),
            }

            if since_save >= SAVE_EVERY_LISTINGS {
                store.save_with_retry(&catalog)?;
                since_save = 0;
            }

            politeness_delay(opts.min_delay_ms, opts.max_delay_ms);
        }
    }

    store.save_with_retry(&catalog)?;
    info!(
        "scrape finished: {} records in catalog ({new_records} new)",
        catalog.len()
    );
    Ok(catalog)
}

fn politeness_delay(min_ms: u64, max_ms: u64) {
    let ms = if max_ms > min_ms {
        rand::thread_rng().gen_range(min_ms..=max_ms)
    } else {
        min_ms
    };
    std::thread::sleep(Duration::from_millis(ms));
}
