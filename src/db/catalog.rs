// src/db/catalog.rs
//
// The catalog file doubles as the checkpoint: every save writes the full
// record set to a temp file and renames it over the previous snapshot, so a
// crash mid-write never loses more than the batch in flight.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::db::csv::{parse_rows, write_row};
use crate::domain::ryokan::Ryokan;
use crate::errors::PipelineError;

/// Semicolon keeps addresses and descriptions with commas unquoted, and the
/// BOM keeps spreadsheet tools happy with UTF-8.
pub const SEPARATOR: char = ';';
const BOM: &str = "\u{feff}";

pub const HEADERS: [&str; 15] = [
    "url",
    "name",
    "address",
    "price_min",
    "price_max",
    "rooms_open_air",
    "rental_open_air",
    "rental_indoor",
    "rental_both",
    "rating",
    "tags",
    "description",
    "transportation",
    "lat",
    "lon",
];

#[derive(Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full record set as one consistent snapshot.
    pub fn save(&self, records: &[Ryokan]) -> Result<(), PipelineError> {
        let mut buf: Vec<u8> = Vec::new();
        buf.extend_from_slice(BOM.as_bytes());

        let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        write_row(&mut buf, &headers, SEPARATOR)
            .map_err(|e| PipelineError::Store(format!("serialize header: {e}")))?;
        for record in records {
            write_row(&mut buf, &record_to_row(record), SEPARATOR)
                .map_err(|e| PipelineError::Store(format!("serialize {}: {e}", record.url)))?;
        }

        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, &buf)
            .map_err(|e| PipelineError::Store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| PipelineError::Store(format!("rename over {}: {e}", self.path.display())))
    }

    /// One failed save is retried before giving up; the caller still holds
    /// the in-memory records either way.
    pub fn save_with_retry(&self, records: &[Ryokan]) -> Result<(), PipelineError> {
        if let Err(first) = self.save(records) {
            warn!("checkpoint save failed, retrying once: {first}");
            return self.save(records);
        }
        Ok(())
    }

    /// Load a prior run's snapshot. A missing file is an empty catalog, not
    /// an error; malformed rows are logged and skipped.
    pub fn load(&self) -> Result<Vec<Ryokan>, PipelineError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| PipelineError::Store(format!("read {}: {e}", self.path.display())))?;
        let text = text.strip_prefix(BOM).unwrap_or(&text);

        let mut records = Vec::new();
        for (i, row) in parse_rows(text, SEPARATOR).into_iter().enumerate() {
            if i == 0 && row.first().map(String::as_str) == Some("url") {
                continue; // header
            }
            match row_to_record(&row) {
                Some(record) => records.push(record),
                None => warn!("skipping malformed catalog row {}", i + 1),
            }
        }
        Ok(records)
    }
}

pub fn record_to_row(r: &Ryokan) -> Vec<String> {
    vec![
        r.url.clone(),
        r.name.clone(),
        r.address.clone(),
        r.price_min.to_string(),
        r.price_max.to_string(),
        r.rooms_open_air.to_string(),
        format_bool(r.rental_open_air),
        format_bool(r.rental_indoor),
        format_bool(r.rental_both),
        r.rating.to_string(),
        format_tags(&r.tags),
        r.description.clone(),
        r.transportation.clone(),
        r.lat.map(|v| v.to_string()).unwrap_or_default(),
        r.lon.map(|v| v.to_string()).unwrap_or_default(),
    ]
}

pub fn row_to_record(row: &[String]) -> Option<Ryokan> {
    if row.len() != HEADERS.len() || row[0].is_empty() {
        return None;
    }

    // Coordinates only count when both cells parse; a lone latitude is
    // treated as unresolved.
    let lat = row[13].parse::<f64>().ok();
    let lon = row[14].parse::<f64>().ok();
    let (lat, lon) = match (lat, lon) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    };

    Some(Ryokan {
        url: row[0].clone(),
        name: row[1].clone(),
        address: row[2].clone(),
        price_min: row[3].parse().unwrap_or(0),
        price_max: row[4].parse().unwrap_or(0),
        rooms_open_air: row[5].parse().unwrap_or(0),
        rental_open_air: parse_bool(&row[6]),
        rental_indoor: parse_bool(&row[7]),
        rental_both: parse_bool(&row[8]),
        rating: row[9].parse().unwrap_or(0.0),
        tags: parse_tags(&row[10]),
        description: row[11].clone(),
        transportation: row[12].clone(),
        lat,
        lon,
    })
}

fn format_bool(v: bool) -> String {
    (if v { "True" } else { "False" }).to_string()
}

fn parse_bool(cell: &str) -> bool {
    cell.trim() == "True"
}

/// Tags serialize as a bracketed, single-quoted list (`['Onsen', 'Luxury']`)
/// so existing consumers of the file keep working.
pub fn format_tags(tags: &[String]) -> String {
    let quoted: Vec<String> = tags
        .iter()
        .map(|t| format!("'{}'", t.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

pub fn parse_tags(cell: &str) -> Vec<String> {
    let inner = cell.trim();
    let inner = inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(inner);

    let mut tags = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' && in_quote {
            escaped = true;
        } else if ch == '\'' {
            if in_quote {
                tags.push(std::mem::take(&mut current));
            }
            in_quote = !in_quote;
        } else if !in_quote {
            // separators between quoted items
        } else {
            current.push(ch);
        }
    }
    tags
}
