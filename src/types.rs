use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ExtractionError;

/// Job identifier assigned by the READY server to a submitted run.
///
/// Always non-empty ASCII alphanumerics, so it can be placed straight into
/// a URL path or query without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobIdentifier(String);

impl JobIdentifier {
    pub fn new(raw: impl Into<String>) -> Result<Self, ExtractionError> {
        let raw = raw.into();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExtractionError::InvalidIdentifier(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JobIdentifier {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for JobIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trajectory direction relative to the start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Backward,
    Forward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backward => write!(f, "Backward"),
            Self::Forward => write!(f, "Forward"),
        }
    }
}

/// Inputs for a trajectory run.
///
/// Defaults reproduce a 7-day backward run from Chicago O'Hare on the
/// GDAS1 archive. Any field left out of a params file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryParams {
    /// Meteorology data set, e.g. `GDAS1`
    pub met_data: String,
    /// Archive file within the data set, e.g. `gdas1.oct22.w5`
    pub met_file: String,
    /// Source latitude in decimal degrees (negative = south)
    pub latitude: f64,
    /// Source longitude in decimal degrees (negative = west)
    pub longitude: f64,
    pub direction: Direction,
    /// Vertical motion method index (0 = model vertical velocity)
    pub vertical_motion: u8,
    /// Two-digit start year
    pub start_year: u8,
    pub start_month: u8,
    pub start_day: u8,
    pub start_hour: u8,
    /// Run duration in hours
    pub duration_hours: u32,
    /// Hours between repeated trajectory starts (0 = no repeat)
    pub repeat_source: u32,
    pub trajectory_count: u32,
    /// Up to three source heights in metres above ground level
    pub source_heights_m: [u32; 3],
}

impl Default for TrajectoryParams {
    fn default() -> Self {
        Self {
            met_data: "GDAS1".to_string(),
            met_file: "gdas1.oct22.w5".to_string(),
            latitude: 41.98,
            longitude: -87.90,
            direction: Direction::Backward,
            vertical_motion: 0,
            start_year: 22,
            start_month: 10,
            start_day: 29,
            start_hour: 22,
            duration_hours: 168,
            repeat_source: 0,
            trajectory_count: 24,
            source_heights_m: [500, 0, 0],
        }
    }
}

/// A downloaded result archive and where it was written
#[derive(Debug, Clone)]
pub struct ResultArchive {
    pub job_id: JobIdentifier,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}
