//! Trip Aggregator
//!
//! At most one trip is open at a time. Each recorded reading updates the
//! running maxima and re-derives distance and average speed from the full
//! ordered reading history. The recompute is O(n) per reading; trips are
//! bounded by device runtime, so simplicity wins over incremental
//! accumulation.

use crate::trip::Trip;
use chrono::Utc;
use obd_protocol::Reading;
use tracing::{debug, info};

/// Tank size assumed for the end-of-trip fuel consumption estimate
pub const ASSUMED_TANK_CAPACITY_L: f64 = 50.0;

struct OpenTrip {
    trip: Trip,
    readings: Vec<Reading>,
}

impl OpenTrip {
    fn new() -> Self {
        Self {
            trip: Trip::start(),
            readings: Vec::new(),
        }
    }
}

/// Aggregates readings into trip statistics
#[derive(Default)]
pub struct TripAggregator {
    current: Option<OpenTrip>,
}

impl TripAggregator {
    /// Create an aggregator with no open trip
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new trip. An already-open trip is ended first; its
    /// finalized record is returned so the caller can persist it.
    pub fn start_trip(&mut self) -> Option<Trip> {
        let previous = self.end_trip();
        let open = OpenTrip::new();
        info!(trip_id = %open.trip.id, "trip started");
        self.current = Some(open);
        previous
    }

    /// Fold one reading into the open trip. A reading recorded with no
    /// trip open is ignored.
    pub fn record_reading(&mut self, reading: &Reading) {
        let Some(open) = self.current.as_mut() else {
            debug!("reading recorded with no open trip");
            return;
        };

        open.trip.max_rpm = open.trip.max_rpm.max(reading.rpm);
        open.trip.max_speed = open.trip.max_speed.max(reading.speed);
        open.readings.push(reading.clone());

        if open.readings.len() > 1 {
            let (distance, average_speed) = derive_motion(&open.readings);
            open.trip.distance = distance;
            open.trip.average_speed = average_speed;
        }
    }

    /// End the open trip, finalizing its statistics. Returns the closed
    /// trip, or `None` when no trip was open.
    pub fn end_trip(&mut self) -> Option<Trip> {
        let mut open = self.current.take()?;
        open.trip.end_time = Some(Utc::now());
        open.trip.fuel_consumption = fuel_consumption(&open.readings, open.trip.distance);
        info!(
            trip_id = %open.trip.id,
            distance_km = open.trip.distance,
            readings = open.readings.len(),
            "trip ended"
        );
        Some(open.trip)
    }

    /// The open trip's running statistics, if any
    pub fn current(&self) -> Option<&Trip> {
        self.current.as_ref().map(|open| &open.trip)
    }
}

/// Re-derive distance (km) and average speed (km/h) from the full ordered
/// reading history: trapezoidal speed integration over consecutive pairs.
fn derive_motion(readings: &[Reading]) -> (f64, f64) {
    let mut distance = 0.0;
    for pair in readings.windows(2) {
        let elapsed = (pair[1].timestamp - pair[0].timestamp)
            .num_milliseconds() as f64
            / 1000.0;
        let avg_kms = f64::from(pair[0].speed + pair[1].speed) / 2.0 / 3600.0;
        distance += avg_kms * elapsed;
    }

    let speed_sum: f64 = readings.iter().map(|r| f64::from(r.speed)).sum();
    let average_speed = speed_sum / readings.len() as f64;

    (distance, average_speed)
}

/// Fuel consumption (L/100km) from the first and last fuel-level readings,
/// assuming a fixed tank capacity. Zero when the trip covered no distance
/// or fuel did not decrease.
fn fuel_consumption(readings: &[Reading], distance: f64) -> f64 {
    let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
        return 0.0;
    };
    let used_percent = (first.fuel_level - last.fuel_level).max(0.0);
    if used_percent <= 0.0 || distance <= 0.0 {
        return 0.0;
    }
    let litres_used = used_percent / 100.0 * ASSUMED_TANK_CAPACITY_L;
    litres_used / (distance / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn reading(offset_s: i64, speed: i32, rpm: i32, fuel: f64) -> Reading {
        Reading {
            rpm,
            speed,
            fuel_level: fuel,
            timestamp: Utc::now() + Duration::seconds(offset_s),
            connected: true,
            ..Reading::default()
        }
    }

    #[test]
    fn test_start_trip_closes_previous() {
        let mut agg = TripAggregator::new();
        assert!(agg.start_trip().is_none());
        let first_id = agg.current().unwrap().id;

        let closed = agg.start_trip().expect("previous trip should close");
        assert_eq!(closed.id, first_id);
        assert!(!closed.is_open());
        assert_ne!(agg.current().unwrap().id, first_id);
    }

    #[test]
    fn test_end_trip_without_open_trip() {
        let mut agg = TripAggregator::new();
        assert!(agg.end_trip().is_none());
    }

    #[test]
    fn test_empty_trip_finalizes_to_zero() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        let trip = agg.end_trip().unwrap();
        assert_eq!(trip.distance, 0.0);
        assert_eq!(trip.fuel_consumption, 0.0);
        assert!(trip.end_time.is_some());
    }

    #[test]
    fn test_maxima_track_readings() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        agg.record_reading(&reading(0, 50, 2000, 80.0));
        agg.record_reading(&reading(1, 90, 3500, 80.0));
        agg.record_reading(&reading(2, 70, 2500, 80.0));

        let trip = agg.current().unwrap();
        assert_eq!(trip.max_speed, 90);
        assert_eq!(trip.max_rpm, 3500);
    }

    #[test]
    fn test_distance_and_average_speed() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        // Constant 72 km/h for 10 s = 0.2 km.
        agg.record_reading(&reading(0, 72, 2000, 80.0));
        agg.record_reading(&reading(10, 72, 2000, 80.0));

        let trip = agg.current().unwrap();
        assert!((trip.distance - 0.2).abs() < 1e-6);
        assert!((trip.average_speed - 72.0).abs() < 1e-6);
    }

    #[test]
    fn test_average_speed_counts_all_readings() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        agg.record_reading(&reading(0, 100, 2000, 80.0));
        agg.record_reading(&reading(10, 0, 800, 80.0));
        agg.record_reading(&reading(20, 50, 1500, 80.0));

        let trip = agg.current().unwrap();
        assert!((trip.average_speed - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_fuel_consumption_estimate() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        // 100 km/h for 360 s = 10 km; fuel 80% -> 76% = 2 L of a 50 L tank.
        agg.record_reading(&reading(0, 100, 2500, 80.0));
        agg.record_reading(&reading(360, 100, 2500, 76.0));

        let trip = agg.end_trip().unwrap();
        assert!((trip.distance - 10.0).abs() < 1e-6);
        // 2 L over 10 km = 20 L/100km.
        assert!((trip.fuel_consumption - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_fuel_increase_yields_zero_consumption() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        agg.record_reading(&reading(0, 100, 2500, 70.0));
        agg.record_reading(&reading(60, 100, 2500, 75.0));

        let trip = agg.end_trip().unwrap();
        assert!(trip.distance > 0.0);
        assert_eq!(trip.fuel_consumption, 0.0);
    }

    #[test]
    fn test_zero_distance_yields_zero_consumption() {
        let mut agg = TripAggregator::new();
        agg.start_trip();
        agg.record_reading(&reading(0, 0, 800, 80.0));
        agg.record_reading(&reading(60, 0, 800, 70.0));

        let trip = agg.end_trip().unwrap();
        assert_eq!(trip.distance, 0.0);
        assert_eq!(trip.fuel_consumption, 0.0);
    }

    #[test]
    fn test_reading_without_trip_is_ignored() {
        let mut agg = TripAggregator::new();
        agg.record_reading(&reading(0, 50, 2000, 80.0));
        assert!(agg.current().is_none());
    }
}
