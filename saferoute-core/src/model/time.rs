//! Time-of-day binning.
//!
//! Risk values are recorded per three-hour bucket; a query time is
//! mapped to the bucket whose start hour is the greatest one not after
//! the query hour.

use std::fmt;

use chrono::NaiveTime;

use crate::Error;

/// One of the eight fixed time-of-day buckets partitioning the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeBucket {
    H00,
    H03,
    H06,
    H09,
    H12,
    H15,
    H18,
    H21,
}

impl TimeBucket {
    /// All buckets in ascending start-hour order.
    pub const ALL: [TimeBucket; 8] = [
        TimeBucket::H00,
        TimeBucket::H03,
        TimeBucket::H06,
        TimeBucket::H09,
        TimeBucket::H12,
        TimeBucket::H15,
        TimeBucket::H18,
        TimeBucket::H21,
    ];

    pub fn start_hour(self) -> u32 {
        match self {
            TimeBucket::H00 => 0,
            TimeBucket::H03 => 3,
            TimeBucket::H06 => 6,
            TimeBucket::H09 => 9,
            TimeBucket::H12 => 12,
            TimeBucket::H15 => 15,
            TimeBucket::H18 => 18,
            TimeBucket::H21 => 21,
        }
    }

    /// Wall-clock label of the bucket start, `"HH:00:00"`.
    pub fn label(self) -> &'static str {
        match self {
            TimeBucket::H00 => "00:00:00",
            TimeBucket::H03 => "03:00:00",
            TimeBucket::H06 => "06:00:00",
            TimeBucket::H09 => "09:00:00",
            TimeBucket::H12 => "12:00:00",
            TimeBucket::H15 => "15:00:00",
            TimeBucket::H18 => "18:00:00",
            TimeBucket::H21 => "21:00:00",
        }
    }

    /// Bucket-qualified name of the risk attribute in the graph store.
    pub fn risk_attr(self) -> &'static str {
        match self {
            TimeBucket::H00 => "risk_00:00:00",
            TimeBucket::H03 => "risk_03:00:00",
            TimeBucket::H06 => "risk_06:00:00",
            TimeBucket::H09 => "risk_09:00:00",
            TimeBucket::H12 => "risk_12:00:00",
            TimeBucket::H15 => "risk_15:00:00",
            TimeBucket::H18 => "risk_18:00:00",
            TimeBucket::H21 => "risk_21:00:00",
        }
    }

    /// Maps a `HH:MM:SS` time-of-day string to its bucket.
    ///
    /// The bucket with the greatest start hour not after the query hour
    /// wins; a time before every bucket start wraps to the earliest
    /// bucket rather than failing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when the string does not parse as a
    /// wall-clock time.
    pub fn from_time_str(time: &str) -> Result<Self, Error> {
        let parsed = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .map_err(|e| Error::InvalidInput(format!("bad time '{time}': {e}")))?;
        Ok(Self::for_hour(chrono::Timelike::hour(&parsed)))
    }

    /// Wrap-around floor over the bucket start hours.
    pub fn for_hour(hour: u32) -> Self {
        Self::ALL
            .iter()
            .rev()
            .find(|b| b.start_hour() <= hour)
            .copied()
            .unwrap_or(Self::ALL[0])
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
