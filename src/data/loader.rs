use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::ByteRecord;
use thiserror::Error;

use super::model::{Incident, IncidentDataset};

/// Column holding the report date, e.g. `1-Jan-15`.
pub const DATE_COLUMN: &str = "GO Report Date";
/// Column holding the offense description used as crime type.
pub const OFFENSE_COLUMN: &str = "GO Highest Offense Desc";

const LATITUDE_COLUMN: &str = "Latitude";
const LONGITUDE_COLUMN: &str = "Longitude";

/// Format of a report date once its two-digit year has been expanded.
const REPORT_DATE_FORMAT: &str = "%d-%b-%Y";
const YEAR_PIVOT: i32 = 69;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to read the dataset as a whole. Individual bad rows never
/// produce one of these; they are dropped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required column '{0}'")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the incident CSV at `path`.
pub fn load_file(path: &Path) -> Result<IncidentDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_reader(file)?;
    log::info!(
        "Loaded {} incidents ({} crime types) from {}",
        dataset.len(),
        dataset.crime_types.len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse incident CSV from any reader.
///
/// Expected header (extra columns are ignored):
///
/// ```text
/// GO Report Date,GO Highest Offense Desc,Latitude,Longitude
/// 1-Jan-15,THEFT,30.2672,-97.7431
/// ```
///
/// A row is dropped when its date or offense is empty or the date does not
/// parse. Unparseable coordinates become `NaN`. Fields are decoded lossily,
/// so invalid UTF-8 never costs a row on its own.
pub fn load_reader<R: Read>(reader: R) -> Result<IncidentDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = Columns::resolve(reader.byte_headers()?)?;

    let mut incidents = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.byte_records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                log::debug!("CSV row {row_no}: skipping undecodable row: {e}");
                dropped += 1;
                continue;
            }
        };

        match columns.incident(&record) {
            Some(incident) => incidents.push(incident),
            None => {
                log::trace!("CSV row {row_no}: missing or invalid date/offense");
                dropped += 1;
            }
        }
    }

    log::debug!(
        "Parsed {} rows: kept {}, dropped {dropped}",
        incidents.len() + dropped,
        incidents.len()
    );

    Ok(IncidentDataset::from_incidents(incidents))
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Positions of the columns the loader reads, resolved once from the header.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    offense: usize,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl Columns {
    fn resolve(headers: &ByteRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name.as_bytes());
        Ok(Columns {
            date: find(DATE_COLUMN).ok_or(LoadError::MissingColumn(DATE_COLUMN))?,
            offense: find(OFFENSE_COLUMN).ok_or(LoadError::MissingColumn(OFFENSE_COLUMN))?,
            latitude: find(LATITUDE_COLUMN),
            longitude: find(LONGITUDE_COLUMN),
        })
    }

    fn incident(&self, record: &ByteRecord) -> Option<Incident> {
        let field = |idx: usize| record.get(idx).map(String::from_utf8_lossy);
        let coordinate = |idx: Option<usize>| parse_coordinate(idx.and_then(field).as_deref());

        let offense = field(self.offense)?;
        let crime_type = offense.trim();
        if crime_type.is_empty() {
            return None;
        }
        let date = parse_report_date(&field(self.date)?)?;
        Some(Incident {
            date,
            lat: coordinate(self.latitude),
            lng: coordinate(self.longitude),
            crime_type: crime_type.to_string(),
        })
    }
}

/// Parse a `D-Mon-YY` report date such as `1-Jan-15`.
///
/// Two-digit years below 69 fall in the 2000s, the rest in the 1900s.
pub fn parse_report_date(s: &str) -> Option<NaiveDate> {
    let (day_month, yy) = s.trim().rsplit_once('-')?;
    if yy.len() != 2 || !yy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = yy.parse().ok()?;
    let year = if yy < YEAR_PIVOT { 2000 + yy } else { 1900 + yy };
    NaiveDate::parse_from_str(&format!("{day_month}-{year}"), REPORT_DATE_FORMAT).ok()
}

/// Parse a decimal-degree coordinate; anything unusable becomes `NaN`.
pub fn parse_coordinate(s: Option<&str>) -> f64 {
    s.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
