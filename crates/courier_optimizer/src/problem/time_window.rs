use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use crate::error::ProblemError;

/// Allowed arrival interval, in minutes from the shift start.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    earliest: f64,
    latest: f64,
}

impl TimeWindow {
    pub fn new(earliest: f64, latest: f64) -> Self {
        TimeWindow { earliest, latest }
    }

    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    pub fn latest(&self) -> f64 {
        self.latest
    }

    pub fn is_valid(&self) -> bool {
        self.earliest.is_finite() && self.latest.is_finite() && self.earliest <= self.latest
    }

    pub fn is_satisfied(&self, arrival: f64) -> bool {
        arrival <= self.latest
    }

    /// Minutes past `latest`, zero when on time.
    pub fn lateness(&self, arrival: f64) -> f64 {
        (arrival - self.latest).max(0.0)
    }

    /// Arriving early means waiting for the window to open.
    pub fn service_start(&self, arrival: f64) -> f64 {
        arrival.max(self.earliest)
    }
}

pub fn parse_clock_time(value: &str) -> Result<Time, ProblemError> {
    value
        .trim()
        .parse::<Time>()
        .map_err(|source| ProblemError::InvalidTime {
            value: value.to_owned(),
            source,
        })
}

/// Converts a clock time such as `"11:00"` into minutes elapsed since `shift_start`.
/// Times before the shift start yield negative values.
pub fn minutes_from_shift_start(value: &str, shift_start: Time) -> Result<f64, ProblemError> {
    let time = parse_clock_time(value)?;

    Ok(minutes_of_day(time) - minutes_of_day(shift_start))
}

fn minutes_of_day(time: Time) -> f64 {
    f64::from(time.hour()) * 60.0 + f64::from(time.minute()) + f64::from(time.second()) / 60.0
}
