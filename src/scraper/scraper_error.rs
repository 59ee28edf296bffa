use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ScraperError {
    Network(String),
    Status(u16, String),
}

impl fmt::Display for ScraperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScraperError::Network(msg) => write!(f, "Network error: {msg}"),
            ScraperError::Status(code, url) => write!(f, "HTTP {code} for {url}"),
        }
    }
}

impl Error for ScraperError {}
