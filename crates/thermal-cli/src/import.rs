//! JSON track files.
//!
//! A track file holds one flight:
//!
//! ```json
//! { "date": "2017-07-08", "pilot": "...", "airplane": "LS4",
//!   "fixes": [{ "lat": 45.5, "lon": 6.3, "altitude_m": 812.0,
//!               "timestamp": "2017-07-08T11:30:00Z" }] }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thermal_core::{Fix, Flight, ThermalError};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} contains no fixes", .path.display())]
    NoFixes { path: PathBuf },
    #[error("invalid track in {}: {source}", .path.display())]
    InvalidTrack {
        path: PathBuf,
        source: ThermalError,
    },
}

/// On-disk representation of one flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub pilot: String,
    #[serde(alias = "airplane_id", alias = "glider")]
    pub airplane: String,
    pub fixes: Vec<Fix>,
}

impl TrackRecord {
    pub fn from_flight(flight: &Flight) -> Self {
        Self {
            date: flight.date,
            pilot: flight.pilot.clone(),
            airplane: flight.airplane_id.clone(),
            fixes: flight.fixes().to_vec(),
        }
    }

    pub fn into_flight(self) -> Flight {
        Flight::new(self.date, self.pilot, self.airplane).with_fixes(self.fixes)
    }
}

/// Parse a track file without validating it.
pub fn read_track(path: &Path) -> Result<TrackRecord, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ImportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate a track file.
pub fn load_flight(path: &Path) -> Result<Flight, ImportError> {
    let record = read_track(path)?;
    if record.fixes.is_empty() {
        return Err(ImportError::NoFixes {
            path: path.to_path_buf(),
        });
    }

    let flight = record.into_flight();
    flight.validate().map_err(|source| ImportError::InvalidTrack {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        fixes = flight.num_fixes(),
        glider = %flight.airplane_id,
        "loaded track"
    );
    Ok(flight)
}

/// Write `flight` as a pretty-printed track file.
pub fn write_track(path: &Path, flight: &Flight) -> Result<(), ImportError> {
    let io_error = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &TrackRecord::from_flight(flight)).map_err(
        |source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        },
    )?;
    writer.flush().map_err(io_error)
}
