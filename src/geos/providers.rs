// src/geos/providers.rs

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::errors::PipelineError;
use crate::geos::rate_limit::RateGate;
use crate::geos::resolver::GeocodeOutcome;

const GEOCODER_USER_AGENT: &str = "ryokan_explorer_app_v1";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

// Nominatim's usage policy demands at most ~1 req/s; Photon tolerates a
// faster cadence.
const NOMINATIM_MIN_INTERVAL: Duration = Duration::from_millis(1100);
const PHOTON_MIN_INTERVAL: Duration = Duration::from_millis(500);

const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const PHOTON_SEARCH_URL: &str = "https://photon.komoot.io/api";

/// One geocoding backend: free-text query in, coordinates or a miss out.
/// `lookup` takes `&mut self` because every provider paces itself through
/// its own rate gate.
pub trait Geocoder {
    fn name(&self) -> &'static str;
    fn lookup(&mut self, query: &str) -> GeocodeOutcome;
}

fn build_client() -> Result<Client, PipelineError> {
    Client::builder()
        .user_agent(GEOCODER_USER_AGENT)
        .timeout(LOOKUP_TIMEOUT)
        .build()
        .map_err(|e| PipelineError::Geocode(format!("build geocoding client: {e}")))
}

// ----- Nominatim (primary, strict) -----

#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

pub struct NominatimClient {
    client: Client,
    gate: RateGate,
}

impl NominatimClient {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_client()?,
            gate: RateGate::new(NOMINATIM_MIN_INTERVAL),
        })
    }
}

impl Geocoder for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn lookup(&mut self, query: &str) -> GeocodeOutcome {
        self.gate.wait();

        let response = self
            .client
            .get(NOMINATIM_SEARCH_URL)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send();

        let response = match response {
            Ok(r) => r,
            Err(e) => return GeocodeOutcome::ProviderError(e.to_string()),
        };
        if !response.status().is_success() {
            return GeocodeOutcome::ProviderError(format!("HTTP {}", response.status()));
        }

        let places: Vec<NominatimPlace> = match response.json() {
            Ok(p) => p,
            Err(e) => return GeocodeOutcome::ProviderError(format!("bad response body: {e}")),
        };

        match places.first() {
            Some(place) => match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => GeocodeOutcome::Found { lat, lon },
                _ => GeocodeOutcome::ProviderError("unparseable coordinates".to_string()),
            },
            None => GeocodeOutcome::NotFound,
        }
    }
}

// ----- Photon (secondary, permissive) -----

#[derive(Deserialize)]
struct PhotonResponse {
    features: Vec<PhotonFeature>,
}

#[derive(Deserialize)]
struct PhotonFeature {
    geometry: PhotonGeometry,
}

#[derive(Deserialize)]
struct PhotonGeometry {
    // GeoJSON order: [lon, lat]
    coordinates: Vec<f64>,
}

pub struct PhotonClient {
    client: Client,
    gate: RateGate,
}

impl PhotonClient {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_client()?,
            gate: RateGate::new(PHOTON_MIN_INTERVAL),
        })
    }
}

impl Geocoder for PhotonClient {
    fn name(&self) -> &'static str {
        "photon"
    }

    fn lookup(&mut self, query: &str) -> GeocodeOutcome {
        self.gate.wait();

        let response = self
            .client
            .get(PHOTON_SEARCH_URL)
            .query(&[("q", query), ("limit", "1")])
            .send();

        let response = match response {
            Ok(r) => r,
            Err(e) => return GeocodeOutcome::ProviderError(e.to_string()),
        };
        if !response.status().is_success() {
            return GeocodeOutcome::ProviderError(format!("HTTP {}", response.status()));
        }

        let parsed: PhotonResponse = match response.json() {
            Ok(p) => p,
            Err(e) => return GeocodeOutcome::ProviderError(format!("bad response body: {e}")),
        };

        match parsed.features.first() {
            Some(feature) => match feature.geometry.coordinates.as_slice() {
                [lon, lat, ..] => GeocodeOutcome::Found {
                    lat: *lat,
                    lon: *lon,
                },
                _ => GeocodeOutcome::ProviderError("unparseable coordinates".to_string()),
            },
            None => GeocodeOutcome::NotFound,
        }
    }
}
