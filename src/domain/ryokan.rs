// src/domain/ryokan.rs

/// One catalog entry for a ryokan, keyed by its listing URL.
///
/// Created by the extractor with `lat`/`lon` absent; the geocoding stage
/// fills both coordinates at once or leaves both empty. A record that
/// already carries coordinates is never re-resolved on a resumed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Ryokan {
    /// Absolute listing URL. Unique across the whole catalog.
    pub url: String,

    pub name: String,
    pub address: String,

    // Price range in yen per night. 0 = unknown.
    pub price_min: u32,
    pub price_max: u32,

    /// Rooms with an open-air bath. 0 = unknown/none. A value of 1 may be
    /// the availability sentinel (see extractor), so treat only as `> 0`.
    pub rooms_open_air: u32,

    // Rental (private-use) tub offerings. Independent flags: a ryokan can
    // offer more than one rental type.
    pub rental_open_air: bool,
    pub rental_indoor: bool,
    pub rental_both: bool,

    /// Review rating in [0.0, 5.0]. 0.0 = unknown.
    pub rating: f64,

    /// Category tags in source order.
    pub tags: Vec<String>,

    pub description: String,

    /// Transit directions, "(...)"-paragraphs joined with " | ".
    pub transportation: String,

    // Both present or both absent.
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Ryokan {
    /// A record with every field at its documented default.
    pub fn unknown(url: impl Into<String>) -> Self {
        Ryokan {
            url: url.into(),
            name: "Unknown".to_string(),
            address: "Unknown".to_string(),
            price_min: 0,
            price_max: 0,
            rooms_open_air: 0,
            rental_open_air: false,
            rental_indoor: false,
            rental_both: false,
            rating: 0.0,
            tags: Vec::new(),
            description: String::new(),
            transportation: String::new(),
            lat: None,
            lon: None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }

    pub fn set_coordinates(&mut self, lat: f64, lon: f64) {
        self.lat = Some(lat);
        self.lon = Some(lon);
    }
}
