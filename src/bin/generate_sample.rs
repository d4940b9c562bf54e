use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index drawn proportionally to `weights`.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut pick = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if pick < *w {
                return i;
            }
            pick -= w;
        }
        weights.len() - 1
    }
}

const ROWS: usize = 20_000;

/// (offense description, relative frequency)
const OFFENSES: [(&str, f64); 10] = [
    ("THEFT", 30.0),
    ("BURGLARY OF VEHICLE", 14.0),
    ("FAMILY DISTURBANCE", 10.0),
    ("CRIMINAL MISCHIEF", 8.0),
    ("ASSAULT W/INJURY-FAM/DATE VIOL", 5.0),
    ("BURGLARY OF RESIDENCE", 5.0),
    ("DWI", 4.0),
    ("HARASSMENT", 4.0),
    ("AUTO THEFT", 3.0),
    ("ROBBERY BY ASSAULT", 1.0),
];

/// (lat, lng, spread in degrees, weight) of incident hot spots around Austin.
const HOTSPOTS: [(f64, f64, f64, f64); 5] = [
    (30.2672, -97.7431, 0.02, 5.0), // downtown
    (30.2849, -97.7341, 0.015, 2.0), // campus
    (30.3560, -97.6970, 0.04, 2.0), // north
    (30.2240, -97.7690, 0.03, 2.0), // south
    (30.3200, -97.6600, 0.05, 1.0), // east
];

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dataset/Annual_Crime_Dataset_2015withLongLad.csv"));

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    writer.write_record([
        "GO Primary Key",
        "GO Highest Offense Desc",
        "GO Report Date",
        "Latitude",
        "Longitude",
    ])?;

    let mut rng = SimpleRng::new(2015);
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).context("invalid start date")?;
    let offense_weights: Vec<f64> = OFFENSES.iter().map(|o| o.1).collect();
    let hotspot_weights: Vec<f64> = HOTSPOTS.iter().map(|h| h.3).collect();
    let mut malformed = 0usize;

    for key in 0..ROWS {
        let offense = OFFENSES[rng.weighted(&offense_weights)].0;
        let date = start + Days::new(rng.below(365) as u64);
        let (lat0, lng0, spread, _) = HOTSPOTS[rng.weighted(&hotspot_weights)];

        let mut date_field = date.format("%-d-%b-%y").to_string();
        let mut offense_field = offense.to_string();
        let mut lat_field = format!("{:.6}", rng.gauss(lat0, spread));
        let mut lng_field = format!("{:.6}", rng.gauss(lng0, spread));

        // Sprinkle in the data-quality problems of the real export.
        match rng.below(100) {
            0 => {
                date_field.clear();
                malformed += 1;
            }
            1 => {
                offense_field.clear();
                malformed += 1;
            }
            2..=6 => {
                lat_field.clear();
                lng_field.clear();
            }
            7 => lat_field = "N/A".to_string(),
            _ => {}
        }

        writer.write_record([
            (20_155_000_000u64 + key as u64).to_string(),
            offense_field,
            date_field,
            lat_field,
            lng_field,
        ])?;
    }
    writer.flush()?;

    println!(
        "Wrote {ROWS} incidents ({malformed} without date or offense) to {}",
        output_path.display()
    );
    Ok(())
}
