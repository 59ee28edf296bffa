use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::geos::{GeocodeOutcome, Geocoder};
use crate::scraper::extract::FragmentFetcher;

/// A complete listing page with every extractable structure present.
pub fn sample_listing() -> &'static str {
    r#"<html>
<body>
<article>
    <h1>Hanayashiki Ukifune-en</h1>
    <p class="txt-address">77 Yumoto, Hakone-machi Show map</p>
    <div>
        <h2 id="tit-price">Price range</h2>
        <p><span>15,000 - 30,000 yen / person</span></p>
    </div>
    <div class="ryokan-text">
        <div class="content">
            <p>A quiet inn on the Haya river.</p>
            <p>Rooms with open-air bath: 3</p>
        </div>
    </div>
    <div class="detail-private">
        <h3>Rental tubs (private use)</h3>
        <dl><dt>Open-air tubs</dt><dd>2</dd></dl>
        <dl><dt>Indoor tubs</dt><dd>0</dd></dl>
        <dl><dt>Indoor and outdoor tubs</dt><dd>1</dd></dl>
    </div>
    <img src="bubbles.png" alt="4.5 of 5 bubbles">
    <div class="ryokan-category tags">
        <a href="/tag/onsen">Onsen</a>
        <a href="/tag/luxury">Luxury</a>
    </div>
    <p class="txt-Transportation">Transportation</p>
    <p>(10 min walk from Hakone-Yumoto Station)</p>
    <p>Pick-up service available on request.</p>
    <p>(By bus: 15 min from Odawara Station)</p>
</article>
</body>
</html>"#
}

/// Unique path under the system temp dir, one per call.
pub fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{prefix}_{}.{ext}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Fragment fetcher that counts calls and serves a canned body.
pub struct CountingFetcher {
    pub calls: Cell<usize>,
    body: Option<&'static str>,
}

impl CountingFetcher {
    pub fn none() -> Self {
        Self {
            calls: Cell::new(0),
            body: None,
        }
    }

    pub fn with_body(body: &'static str) -> Self {
        Self {
            calls: Cell::new(0),
            body: Some(body),
        }
    }
}

impl FragmentFetcher for CountingFetcher {
    fn fetch_fragment(&self, _url: &str) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        self.body.map(|s| s.to_string())
    }
}

/// Shared call log for a pair of scripted geocoders: entries look like
/// `"primary: Foo Japan"` in the order the resolver issued them.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Geocoder mock replaying a fixed script of outcomes; anything past the
/// script is `NotFound`.
pub struct ScriptedGeocoder {
    label: &'static str,
    script: VecDeque<GeocodeOutcome>,
    log: CallLog,
}

impl ScriptedGeocoder {
    pub fn new(label: &'static str, outcomes: Vec<GeocodeOutcome>, log: CallLog) -> Self {
        Self {
            label,
            script: outcomes.into(),
            log,
        }
    }
}

impl Geocoder for ScriptedGeocoder {
    fn name(&self) -> &'static str {
        self.label
    }

    fn lookup(&mut self, query: &str) -> GeocodeOutcome {
        self.log.borrow_mut().push(format!("{}: {query}", self.label));
        self.script.pop_front().unwrap_or(GeocodeOutcome::NotFound)
    }
}
