//! Trip Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One journey: open while `end_time` is `None`, finalized on end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique trip id
    pub id: Uuid,
    /// When the trip started
    pub start_time: DateTime<Utc>,
    /// When the trip ended; `None` while the trip is open
    pub end_time: Option<DateTime<Utc>>,
    /// Distance driven (km), derived from the speed trace
    pub distance: f64,
    /// Average speed over all readings (km/h)
    pub average_speed: f64,
    /// Estimated fuel consumption (L/100km), computed at trip end
    pub fuel_consumption: f64,
    /// Highest RPM seen
    pub max_rpm: i32,
    /// Highest speed seen (km/h)
    pub max_speed: i32,
}

impl Trip {
    /// Open a new trip starting now
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: None,
            distance: 0.0,
            average_speed: 0.0,
            fuel_consumption: 0.0,
            max_rpm: 0,
            max_speed: 0,
        }
    }

    /// Whether the trip is still open
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Trip duration, up to now for an open trip
    pub fn duration(&self) -> chrono::Duration {
        self.end_time.unwrap_or_else(Utc::now) - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trip_is_open() {
        let trip = Trip::start();
        assert!(trip.is_open());
        assert_eq!(trip.distance, 0.0);
        assert_eq!(trip.fuel_consumption, 0.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let trip = Trip::start();
        let json = serde_json::to_string(&trip).unwrap();
        let back: Trip = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trip);
    }
}
