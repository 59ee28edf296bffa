// src/geos/resolver.rs

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::db::CatalogStore;
use crate::domain::ryokan::Ryokan;
use crate::errors::PipelineError;
use crate::geos::providers::{Geocoder, NominatimClient, PhotonClient};

/// A snapshot every few lookups: geocoding is the slow, rate-limited stage,
/// so crashing mid-run must not forfeit resolved coordinates.
const SAVE_EVERY_LOOKUPS: usize = 10;

/// Outcome of one lookup or of a whole strategy chain. `NotFound` is an
/// expected result, `ProviderError` a transport/service fault; the chain
/// treats both as "try the next strategy".
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found { lat: f64, lon: f64 },
    NotFound,
    ProviderError(String),
}

/// Which of the resolver's two providers a strategy goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Primary,
    Secondary,
}

/// Tries a fixed list of (provider, query) strategies in priority order and
/// stops at the first hit. The two providers pace themselves independently;
/// their rate gates share no state.
pub struct GeocodeResolver {
    primary: Box<dyn Geocoder>,
    secondary: Box<dyn Geocoder>,
}

impl GeocodeResolver {
    pub fn new(primary: Box<dyn Geocoder>, secondary: Box<dyn Geocoder>) -> Self {
        Self { primary, secondary }
    }

    /// Nominatim (strict) as primary, Photon (permissive) as secondary.
    pub fn osm_defaults() -> Result<Self, PipelineError> {
        Ok(Self::new(
            Box::new(NominatimClient::new()?),
            Box::new(PhotonClient::new()?),
        ))
    }

    pub fn resolve(&mut self, name: &str, address: &str) -> GeocodeOutcome {
        for (slot, query) in strategy_queries(name, address) {
            if query.trim().is_empty() {
                continue;
            }
            let provider = match slot {
                Slot::Primary => &mut self.primary,
                Slot::Secondary => &mut self.secondary,
            };
            match provider.lookup(&query) {
                GeocodeOutcome::Found { lat, lon } => {
                    debug!("{} resolved {:?} -> ({lat}, {lon})", provider.name(), query);
                    return GeocodeOutcome::Found { lat, lon };
                }
                GeocodeOutcome::NotFound => {
                    debug!("{} had no match for {:?}", provider.name(), query);
                }
                GeocodeOutcome::ProviderError(e) => {
                    warn!("{} failed on {:?} for {name}: {e}", provider.name(), query);
                }
            }
        }
        GeocodeOutcome::NotFound
    }
}

/// The strategy table, most precise query first. The broadened country-level
/// queries only run once the address-based ones have failed.
fn strategy_queries(name: &str, address: &str) -> [(Slot, String); 4] {
    [
        (Slot::Primary, address.to_string()),
        (Slot::Secondary, format!("{name}, {address}")),
        (Slot::Secondary, format!("{name} Japan")),
        (Slot::Primary, format!("{name} Japan")),
    ]
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct GeocodeSummary {
    pub attempted: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Resolves coordinates for exactly the records that lack them. Records
/// that already carry coordinates are immutable here; an unresolved record
/// stays coordinate-free and is counted, not retried within the run.
pub fn geocode_catalog(
    records: &mut [Ryokan],
    resolver: &mut GeocodeResolver,
    store: &CatalogStore,
    stop: &AtomicBool,
) -> Result<GeocodeSummary, PipelineError> {
    let pending: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.has_coordinates())
        .map(|(i, _)| i)
        .collect();

    if pending.is_empty() {
        info!("all {} records already have coordinates", records.len());
        return Ok(GeocodeSummary::default());
    }
    info!("geocoding {} of {} records", pending.len(), records.len());

    let mut summary = GeocodeSummary::default();
    for idx in pending {
        if stop.load(Ordering::Relaxed) {
            info!(
                "interrupt received, stopping after {} lookups",
                summary.attempted
            );
            break;
        }

        let (name, address) = {
            let r = &records[idx];
            (r.name.clone(), r.address.clone())
        };
        match resolver.resolve(&name, &address) {
            GeocodeOutcome::Found { lat, lon } => {
                records[idx].set_coordinates(lat, lon);
                summary.resolved += 1;
            }
            _ => {
                debug!("unresolved: {}", records[idx].url);
                summary.unresolved += 1;
            }
        }
        summary.attempted += 1;

        if summary.attempted % SAVE_EVERY_LOOKUPS == 0 {
            store.save_with_retry(records)?;
        }
    }

    store.save_with_retry(records)?;
    info!(
        "geocoding finished: {} resolved, {} unresolved",
        summary.resolved, summary.unresolved
    );
    Ok(summary)
}
