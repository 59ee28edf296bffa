// errors.rs
use std::fmt;

use crate::scraper::ScraperError;

/// Errors that end a run: a scrape that could not start, a checkpoint that
/// could not be written even after retrying, or a failed export. Per-page,
/// per-listing and per-provider failures are recovered locally and never
/// reach this type.
#[derive(Debug)]
pub enum PipelineError {
    Scraper(ScraperError),
    Geocode(String),
    Store(String),
    Xlsx(String),
    Init(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Scraper(e) => write!(f, "Scraper error: {e}"),
            PipelineError::Geocode(msg) => write!(f, "Geocoding error: {msg}"),
            PipelineError::Store(msg) => write!(f, "Catalog store error: {msg}"),
            PipelineError::Xlsx(msg) => write!(f, "Spreadsheet export error: {msg}"),
            PipelineError::Init(msg) => write!(f, "Startup error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ScraperError> for PipelineError {
    fn from(e: ScraperError) -> Self {
        PipelineError::Scraper(e)
    }
}
