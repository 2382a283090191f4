//! Summary Statistics

use crate::repository::Repository;
use crate::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rows considered for a summary
const STATS_LIMIT: usize = 10_000;

/// Aggregate view over the stored readings and trips
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_readings: usize,
    pub average_rpm: f64,
    pub max_rpm: i32,
    pub average_speed: f64,
    pub max_speed: i32,
    pub average_temp: f64,
    pub max_temp: i32,
    pub average_fuel_level: f64,
    pub total_trips: usize,
    pub oldest_reading: Option<DateTime<Utc>>,
    pub newest_reading: Option<DateTime<Utc>>,
}

impl Repository {
    /// Summarize the stored readings. An empty store yields the all-zero
    /// summary.
    pub fn statistics(&self) -> Result<Statistics, StorageError> {
        let readings = self.recent_readings(STATS_LIMIT)?;
        let total_trips = self.trips()?.len();
        if readings.is_empty() {
            return Ok(Statistics {
                total_trips,
                ..Statistics::default()
            });
        }

        let count = readings.len() as f64;
        let mut stats = Statistics {
            total_readings: readings.len(),
            total_trips,
            max_temp: i32::MIN,
            ..Statistics::default()
        };

        for stored in &readings {
            let r = &stored.reading;
            stats.average_rpm += f64::from(r.rpm) / count;
            stats.average_speed += f64::from(r.speed) / count;
            stats.average_temp += f64::from(r.engine_temp) / count;
            stats.average_fuel_level += r.fuel_level / count;
            stats.max_rpm = stats.max_rpm.max(r.rpm);
            stats.max_speed = stats.max_speed.max(r.speed);
            stats.max_temp = stats.max_temp.max(r.engine_temp);
        }

        stats.oldest_reading = readings.iter().map(|r| r.reading.timestamp).min();
        stats.newest_reading = readings.iter().map(|r| r.reading.timestamp).max();

        Ok(stats)
    }
}
