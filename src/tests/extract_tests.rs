use scraper::Html;

use crate::domain::logic::{classify_rental_label, RentalCategory};
use crate::domain::ryokan::Ryokan;
use crate::scraper::extract::{extract_listing, FragmentFetcher, NoFetch};
use crate::scraper::text::normalize_text;
use crate::tests::utils::{sample_listing, CountingFetcher};

const TEST_URL: &str = "https://selected-ryokan.com/ryokan/test-inn";

fn extract(html: &str) -> Ryokan {
    extract_with(html, &NoFetch)
}

fn extract_with(html: &str, fetcher: &dyn FragmentFetcher) -> Ryokan {
    let doc = Html::parse_document(html);
    extract_listing(&doc, TEST_URL, fetcher)
}

#[test]
fn full_listing_extracts_every_field() {
    let r = extract(sample_listing());

    assert_eq!(r.url, TEST_URL);
    assert_eq!(r.name, "Hanayashiki Ukifune-en");
    assert_eq!(r.address, "77 Yumoto, Hakone-machi");
    assert_eq!((r.price_min, r.price_max), (15000, 30000));
    assert_eq!(r.rooms_open_air, 3);
    assert!(r.rental_open_air);
    assert!(!r.rental_indoor);
    assert!(r.rental_both);
    assert_eq!(r.rating, 4.5);
    assert_eq!(r.tags, vec!["Onsen", "Luxury"]);
    assert_eq!(r.description, "A quiet inn on the Haya river.");
    assert_eq!(
        r.transportation,
        "(10 min walk from Hakone-Yumoto Station) | (By bus: 15 min from Odawara Station)"
    );
    assert!(r.lat.is_none());
    assert!(r.lon.is_none());
}

#[test]
fn missing_fields_degrade_to_defaults() {
    let r = extract("<html><body><p>nothing useful here</p></body></html>");

    assert_eq!(r.name, "Unknown");
    assert_eq!(r.address, "Unknown");
    assert_eq!((r.price_min, r.price_max), (0, 0));
    assert_eq!(r.rooms_open_air, 0);
    assert!(!r.rental_open_air && !r.rental_indoor && !r.rental_both);
    assert_eq!(r.rating, 0.0);
    assert!(r.tags.is_empty());
    assert_eq!(r.description, "");
    assert_eq!(r.transportation, "");
}

#[test]
fn address_without_show_map_marker_is_kept_whole() {
    let html = r#"<html><body>
        <p class="txt-address">12 Kawaramachi, Kyoto</p>
    </body></html>"#;
    assert_eq!(extract(html).address, "12 Kawaramachi, Kyoto");
}

#[test]
fn single_price_token_sets_min_and_max() {
    let html = r#"<html><body><div>
        <h2 id="tit-price">Price</h2>
        <p><span>From 22,000 yen</span></p>
    </div></body></html>"#;
    let r = extract(html);
    assert_eq!((r.price_min, r.price_max), (22000, 22000));
}

#[test]
fn two_price_tokens_map_to_min_and_max() {
    let html = r#"<html><body><div>
        <h2 id="tit-price">Price</h2>
        <p><span>9,800 - 18,500 yen</span></p>
    </div></body></html>"#;
    let r = extract(html);
    assert_eq!((r.price_min, r.price_max), (9800, 18500));
}

#[test]
fn reversed_price_tokens_still_order_min_max() {
    let html = r#"<html><body><div>
        <h2 id="tit-price">Price</h2>
        <p><span>30,000 down to 12,000 yen</span></p>
    </div></body></html>"#;
    let r = extract(html);
    assert_eq!((r.price_min, r.price_max), (12000, 30000));
}

#[test]
fn rental_label_naming_both_kinds_routes_to_combined_only() {
    let html = r#"<html><body>
        <div class="detail-private">
            <h3>Rental baths</h3>
            <dl><dt>Open-air and indoor tubs</dt><dd>2</dd></dl>
        </div>
    </body></html>"#;
    let r = extract(html);
    assert!(!r.rental_open_air);
    assert!(!r.rental_indoor);
    assert!(r.rental_both);
}

#[test]
fn rental_sections_without_rental_header_are_ignored() {
    let html = r#"<html><body>
        <div class="detail-private">
            <h3>Day-use plans</h3>
            <dl><dt>Open-air tubs</dt><dd>5</dd></dl>
        </div>
    </body></html>"#;
    let r = extract(html);
    assert!(!r.rental_open_air && !r.rental_indoor && !r.rental_both);
}

#[test]
fn non_numeric_rental_count_means_unavailable() {
    let html = r#"<html><body>
        <div class="detail-private">
            <h3>Rental baths</h3>
            <dl><dt>Open-air tubs</dt><dd>Available on request</dd></dl>
        </div>
    </body></html>"#;
    assert!(!extract(html).rental_open_air);
}

#[test]
fn classify_rental_label_routes_each_label_once() {
    assert_eq!(
        classify_rental_label("Open-air tubs"),
        Some(RentalCategory::OpenAir)
    );
    assert_eq!(
        classify_rental_label("Indoor tubs"),
        Some(RentalCategory::Indoor)
    );
    assert_eq!(
        classify_rental_label("Indoor and outdoor tubs"),
        Some(RentalCategory::Both)
    );
    assert_eq!(
        classify_rental_label("Open-air and indoor tubs"),
        Some(RentalCategory::Both)
    );
    assert_eq!(classify_rental_label("Sauna"), None);
}

#[test]
fn stated_room_count_wins_over_availability_marker() {
    let html = r#"<html><body>
        <div class="ryokan-text"><div class="content">
            <p>Rooms with open-air bath: 4</p>
        </div></div>
        <div>
            <h2 id="tit-private-use">Private use</h2>
            <dl><dt>Private onsen</dt><dd>Available</dd></dl>
        </div>
    </body></html>"#;
    assert_eq!(extract(html).rooms_open_air, 4);
}

#[test]
fn availability_marker_alone_yields_sentinel_one() {
    let html = r#"<html><body>
        <div>
            <h2 id="tit-private-use">Private use</h2>
            <dl><dt>Private onsen</dt><dd>Available</dd></dl>
        </div>
    </body></html>"#;
    // 1 here means "available, count unknown", not a measured count.
    assert_eq!(extract(html).rooms_open_air, 1);
}

#[test]
fn no_rating_widget_means_no_fragment_fetch() {
    let fetcher = CountingFetcher::none();
    let r = extract_with(
        "<html><body><h1>Inn</h1></body></html>",
        &fetcher,
    );
    assert_eq!(r.rating, 0.0);
    assert_eq!(fetcher.calls.get(), 0);
}

#[test]
fn inline_rating_skips_the_widget_fetch() {
    let fetcher = CountingFetcher::with_body(r#"<img alt="1.0 of 5 bubbles">"#);
    let html = r#"<html><body>
        <img alt="3.5 of 5 bubbles">
        <iframe src="https://www.tripadvisor.com/WidgetEmbed-cdspropertydetail?locationId=1"></iframe>
    </body></html>"#;
    let r = extract_with(html, &fetcher);
    assert_eq!(r.rating, 3.5);
    assert_eq!(fetcher.calls.get(), 0);
}

#[test]
fn external_widget_rating_is_fetched_and_parsed() {
    let fetcher = CountingFetcher::with_body(r#"<div><img alt="4.0 of 5 bubbles"></div>"#);
    let html = r#"<html><body>
        <iframe src="https://www.tripadvisor.com/WidgetEmbed-cdspropertydetail?locationId=1"></iframe>
    </body></html>"#;
    let r = extract_with(html, &fetcher);
    assert_eq!(r.rating, 4.0);
    assert_eq!(fetcher.calls.get(), 1);
}

#[test]
fn failed_widget_fetch_degrades_to_no_rating() {
    let fetcher = CountingFetcher::none();
    let html = r#"<html><body>
        <iframe src="https://www.tripadvisor.com/WidgetEmbed-cdspropertydetail?locationId=1"></iframe>
    </body></html>"#;
    let r = extract_with(html, &fetcher);
    assert_eq!(r.rating, 0.0);
    assert_eq!(fetcher.calls.get(), 1);
}

#[test]
fn tags_preserve_source_order() {
    let html = r#"<html><body>
        <div class="ryokan-category tags">
            <a>Mountain view</a><a>Onsen</a><a>Family friendly</a>
        </div>
    </body></html>"#;
    assert_eq!(
        extract(html).tags,
        vec!["Mountain view", "Onsen", "Family friendly"]
    );
}

#[test]
fn normalize_text_strips_accents_and_collapses_whitespace() {
    assert_eq!(
        normalize_text("Kyoto\u{a0}Ryokan\n\u{e9}clat"),
        "Kyoto Ryokan eclat"
    );
    assert_eq!(normalize_text("  a \t b  "), "a b");
    assert_eq!(normalize_text(""), "");
}

#[test]
fn accented_heading_is_normalized_in_the_record() {
    let html = "<html><body><h1>Ryokan \u{e9}clat</h1></body></html>";
    assert_eq!(extract(html).name, "Ryokan eclat");
}
