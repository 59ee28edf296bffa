// src/scraper/discover.rs

use std::collections::HashSet;

use log::debug;
use scraper::{Html, Selector};
use url::Url;

/// Harvests listing URLs from one index page: each listing card's primary
/// link, made absolute, filtered down to real listing pages. Output is
/// deduplicated and keeps first-seen order so resumed runs log the same
/// sequence.
pub fn discover_listings(doc: &Html, base: &Url) -> Vec<String> {
    let articles = match Selector::parse("article") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let card_link = match Selector::parse("a.box-link") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for article in doc.select(&articles) {
        let href = article
            .select(&card_link)
            .next()
            .and_then(|a| a.value().attr("href"));
        let href = match href {
            Some(h) => h,
            None => continue,
        };
        let absolute = match base.join(href) {
            Ok(u) => u.to_string(),
            Err(e) => {
                debug!("ignoring unparseable card link {href:?}: {e}");
                continue;
            }
        };
        if is_listing_url(&absolute) && seen.insert(absolute.clone()) {
            urls.push(absolute);
        }
    }

    urls
}

/// Listing pages live under `/ryokan/`; pagination and editorial guides
/// share the directory but are not listings.
fn is_listing_url(url: &str) -> bool {
    url.contains("/ryokan/") && !url.contains("page/") && !url.contains("/guide/")
}
