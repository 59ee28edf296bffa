pub mod discover;
pub mod extract;
mod scraper;
mod scraper_error;
pub mod text;

pub use scraper::{run_scrape, RyokanScraper, ScrapeOptions, BASE_URL, DEFAULT_TOTAL_PAGES};
pub use scraper_error::ScraperError;
