pub mod providers;
pub mod rate_limit;
pub mod resolver;

pub use providers::{Geocoder, NominatimClient, PhotonClient};
pub use rate_limit::RateGate;
pub use resolver::{geocode_catalog, GeocodeOutcome, GeocodeResolver, GeocodeSummary};
