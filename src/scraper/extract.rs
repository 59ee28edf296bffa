// src/scraper/extract.rs
//
// Every field is produced by an ordered list of rules tried against the
// listing document; the first rule that yields a value wins and failures
// degrade to the field default. Extraction as a whole never fails a
// listing.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domain::logic::{classify_rental_label, rental_count_available, RentalCategory};
use crate::domain::ryokan::Ryokan;
use crate::scraper::text::{normalize_before, normalize_text};

/// The address element embeds a "Show map" control whose caption must not
/// leak into the address text.
const SHOW_MAP_MARKER: &str = "Show map";

lazy_static! {
    static ref NUMBER_RUNS: Regex = Regex::new(r"\d+").unwrap();
    static ref OPEN_AIR_ROOMS: Regex = Regex::new(r"(?is)rooms with open-air.*?:\D*(\d+)").unwrap();
    static ref FIRST_FLOAT: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

/// Fetches an external document fragment (the embedded rating widget) under
/// its own short timeout. `None` covers every failure mode; a missing
/// rating is never worth failing a listing over.
pub trait FragmentFetcher {
    fn fetch_fragment(&self, url: &str) -> Option<String>;
}

/// A fetcher for contexts where no widget fetch should ever happen (tests,
/// offline extraction).
pub struct NoFetch;

impl FragmentFetcher for NoFetch {
    fn fetch_fragment(&self, _url: &str) -> Option<String> {
        None
    }
}

pub struct ExtractCtx<'a> {
    pub doc: &'a Html,
    pub url: &'a str,
    pub fragments: &'a dyn FragmentFetcher,
}

type Rule<T> = fn(&ExtractCtx) -> Option<T>;

/// First successful rule wins, else the default. Fallbacks are logged per
/// field so a degraded record can be diagnosed without re-scraping.
fn first_success<T>(ctx: &ExtractCtx, field: &str, rules: &[Rule<T>], default: T) -> T {
    for rule in rules {
        if let Some(value) = rule(ctx) {
            return value;
        }
    }
    debug!("{}: no {field} found, using default", ctx.url);
    default
}

/// Builds the full record for one listing document. Coordinates start
/// absent; the geocoding stage fills them in later.
pub fn extract_listing(doc: &Html, url: &str, fragments: &dyn FragmentFetcher) -> Ryokan {
    let ctx = ExtractCtx { doc, url, fragments };

    let (price_min, price_max) =
        first_success(&ctx, "price range", &[price_range_rule], (0, 0));
    let (rental_open_air, rental_indoor, rental_both) =
        first_success(&ctx, "rental tubs", &[rental_flags_rule], (false, false, false));

    Ryokan {
        url: url.to_string(),
        name: first_success(&ctx, "name", &[name_rule], "Unknown".to_string()),
        address: first_success(&ctx, "address", &[address_rule], "Unknown".to_string()),
        price_min,
        price_max,
        rooms_open_air: first_success(
            &ctx,
            "open-air room count",
            &[rooms_stated_rule, rooms_available_rule],
            0,
        ),
        rental_open_air,
        rental_indoor,
        rental_both,
        rating: first_success(
            &ctx,
            "rating",
            &[rating_inline_rule, rating_widget_rule],
            0.0,
        ),
        tags: first_success(&ctx, "tags", &[tags_rule], Vec::new()),
        description: first_success(&ctx, "description", &[description_rule], String::new()),
        transportation: first_success(
            &ctx,
            "transportation",
            &[transportation_rule],
            String::new(),
        ),
        lat: None,
        lon: None,
    }
}

// ----- selection helpers -----

fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector).next()
}

fn select_in_first<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    el.select(&selector).next()
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

/// Nearest ancestor with the given tag name.
fn enclosing<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

// ----- per-field rules -----

fn name_rule(ctx: &ExtractCtx) -> Option<String> {
    let h1 = select_first(ctx.doc, "h1")?;
    let name = normalize_text(&element_text(h1));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn address_rule(ctx: &ExtractCtx) -> Option<String> {
    let el = select_first(ctx.doc, ".txt-address")?;
    let address = normalize_before(&element_text(el), SHOW_MAP_MARKER);
    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}

fn price_range_rule(ctx: &ExtractCtx) -> Option<(u32, u32)> {
    let heading = select_first(ctx.doc, "#tit-price")?;
    let container = enclosing(heading, "div")?;
    let span = select_in_first(container, "p span")?;

    let text = element_text(span).replace(',', "");
    let numbers: Vec<u32> = NUMBER_RUNS
        .find_iter(&text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    match numbers.as_slice() {
        [] => None,
        [single] => Some((*single, *single)),
        [first, second, ..] => {
            if first <= second {
                Some((*first, *second))
            } else {
                Some((*second, *first))
            }
        }
    }
}

fn rooms_stated_rule(ctx: &ExtractCtx) -> Option<u32> {
    let content = select_first(ctx.doc, ".ryokan-text .content")?;
    let text = element_text(content);
    let caps = OPEN_AIR_ROOMS.captures(&text)?;
    caps[1].parse().ok()
}

/// Private-use section advertises availability without a count. The
/// sentinel 1 means "available, count unknown", not "exactly one room";
/// downstream filters read this field only as `> 0`.
fn rooms_available_rule(ctx: &ExtractCtx) -> Option<u32> {
    let heading = select_first(ctx.doc, "#tit-private-use")?;
    let container = enclosing(heading, "div")?;
    let dl = select_in_first(container, "dl")?;
    if element_text(dl).contains("Available") {
        Some(1)
    } else {
        None
    }
}

fn rental_flags_rule(ctx: &ExtractCtx) -> Option<(bool, bool, bool)> {
    let sections = Selector::parse(".detail-private").ok()?;
    let dls = Selector::parse("dl").ok()?;

    let mut seen_rental_table = false;
    let mut open_air = false;
    let mut indoor = false;
    let mut both = false;

    for section in ctx.doc.select(&sections) {
        let is_rental = select_in_first(section, "h3")
            .map(|h| element_text(h).contains("Rental"))
            .unwrap_or(false);
        if !is_rental {
            continue;
        }
        seen_rental_table = true;

        for dl in section.select(&dls) {
            let label = match select_in_first(dl, "dt") {
                Some(dt) => element_text(dt),
                None => continue,
            };
            let count_cell = match select_in_first(dl, "dd") {
                Some(dd) => element_text(dd),
                None => continue,
            };
            let available = rental_count_available(&count_cell);

            match classify_rental_label(&label) {
                Some(RentalCategory::OpenAir) => open_air = available,
                Some(RentalCategory::Indoor) => indoor = available,
                Some(RentalCategory::Both) => both = available,
                None => {}
            }
        }
    }

    if seen_rental_table {
        Some((open_air, indoor, both))
    } else {
        None
    }
}

/// First float out of an "X of 5 bubbles" accessibility label anywhere in
/// the given tree.
fn bubbles_rating(doc: &Html) -> Option<f64> {
    let imgs = Selector::parse("img").ok()?;
    for img in doc.select(&imgs) {
        if let Some(alt) = img.value().attr("alt") {
            if alt.contains("of 5 bubbles") {
                return FIRST_FLOAT
                    .find(alt)
                    .and_then(|m| m.as_str().parse().ok());
            }
        }
    }
    None
}

fn rating_inline_rule(ctx: &ExtractCtx) -> Option<f64> {
    bubbles_rating(ctx.doc)
}

/// The rating widget is sometimes only referenced as an external fragment.
/// No reference in the page means no fetch is attempted at all.
fn rating_widget_rule(ctx: &ExtractCtx) -> Option<f64> {
    let iframes = Selector::parse("iframe").ok()?;
    let src = ctx
        .doc
        .select(&iframes)
        .filter_map(|f| f.value().attr("src"))
        .find(|src| src.contains("tripadvisor"))?;

    let body = ctx.fragments.fetch_fragment(src)?;
    bubbles_rating(&Html::parse_fragment(&body))
}

fn tags_rule(ctx: &ExtractCtx) -> Option<Vec<String>> {
    let container = select_first(ctx.doc, ".ryokan-category.tags")?;
    let anchors = Selector::parse("a").ok()?;
    Some(
        container
            .select(&anchors)
            .map(|a| normalize_text(&element_text(a)))
            .filter(|t| !t.is_empty())
            .collect(),
    )
}

fn description_rule(ctx: &ExtractCtx) -> Option<String> {
    let content = select_first(ctx.doc, ".ryokan-text .content")?;
    let p = select_in_first(content, "p")?;
    Some(normalize_text(&element_text(p)))
}

/// The source writes transit directions as parenthesized paragraphs inside
/// the section that carries the transportation marker.
fn transportation_rule(ctx: &ExtractCtx) -> Option<String> {
    let marker = select_first(ctx.doc, ".txt-Transportation")?;
    let article = enclosing(marker, "article")?;
    let paragraphs = Selector::parse("p").ok()?;

    let lines: Vec<String> = article
        .select(&paragraphs)
        .map(|p| normalize_text(&element_text(p)))
        .filter(|t| t.starts_with('('))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" | "))
    }
}
