//! Repository Implementation

use crate::StorageError;
use chrono::{DateTime, Duration, Utc};
use obd_protocol::Reading;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};
use trip_stats::Trip;
use uuid::Uuid;

/// Default retention cap (~7 hours at one reading per 500 ms)
const DEFAULT_MAX_READINGS: usize = 50_000;

/// A persisted reading, optionally associated with a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// The decoded snapshot
    pub reading: Reading,
    /// The trip the reading belongs to, if one was open
    pub trip_id: Option<Uuid>,
}

/// In-memory repository for readings and trips
pub struct Repository {
    readings: Mutex<VecDeque<StoredReading>>,
    trips: Mutex<Vec<Trip>>,
    max_readings: usize,
}

impl Repository {
    /// Create a repository with the default retention cap
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_READINGS)
    }

    /// Create a repository retaining at most `max_readings` readings
    pub fn with_capacity(max_readings: usize) -> Self {
        info!(max_readings, "creating in-memory repository");
        Self {
            readings: Mutex::new(VecDeque::new()),
            trips: Mutex::new(Vec::new()),
            max_readings,
        }
    }

    /// Append a reading. The oldest readings are evicted past the
    /// retention cap.
    pub fn insert_reading(
        &self,
        reading: Reading,
        trip_id: Option<Uuid>,
    ) -> Result<(), StorageError> {
        let mut readings = self.readings.lock().map_err(|_| StorageError::LockPoisoned)?;
        while readings.len() >= self.max_readings {
            readings.pop_front();
        }
        readings.push_back(StoredReading { reading, trip_id });
        Ok(())
    }

    /// Most recent readings, newest first
    pub fn recent_readings(&self, limit: usize) -> Result<Vec<StoredReading>, StorageError> {
        let readings = self.readings.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(readings.iter().rev().take(limit).cloned().collect())
    }

    /// Readings within a time range, oldest first
    pub fn readings_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredReading>, StorageError> {
        let readings = self.readings.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(readings
            .iter()
            .filter(|r| r.reading.timestamp >= from && r.reading.timestamp <= to)
            .cloned()
            .collect())
    }

    /// Readings belonging to one trip, oldest first
    pub fn readings_for_trip(&self, trip_id: Uuid) -> Result<Vec<StoredReading>, StorageError> {
        let readings = self.readings.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(readings
            .iter()
            .filter(|r| r.trip_id == Some(trip_id))
            .cloned()
            .collect())
    }

    /// Insert a trip, or replace the stored version with the same id
    pub fn upsert_trip(&self, trip: Trip) -> Result<(), StorageError> {
        let mut trips = self.trips.lock().map_err(|_| StorageError::LockPoisoned)?;
        match trips.iter_mut().find(|t| t.id == trip.id) {
            Some(existing) => *existing = trip,
            None => trips.push(trip),
        }
        Ok(())
    }

    /// All trips, newest start time first
    pub fn trips(&self) -> Result<Vec<Trip>, StorageError> {
        let mut trips = self
            .trips
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone();
        trips.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(trips)
    }

    /// One trip by id
    pub fn trip(&self, trip_id: Uuid) -> Result<Trip, StorageError> {
        self.trips
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .iter()
            .find(|t| t.id == trip_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Delete readings older than the given age. Returns how many were
    /// removed.
    pub fn delete_readings_older_than(&self, age: Duration) -> Result<usize, StorageError> {
        let cutoff = Utc::now() - age;
        let mut readings = self.readings.lock().map_err(|_| StorageError::LockPoisoned)?;
        let before = readings.len();
        readings.retain(|r| r.reading.timestamp >= cutoff);
        let removed = before - readings.len();
        if removed > 0 {
            debug!(removed, "deleted old readings");
        }
        Ok(removed)
    }

    /// Number of stored readings
    pub fn reading_count(&self) -> Result<usize, StorageError> {
        Ok(self
            .readings
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .len())
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reading_at(offset_s: i64, rpm: i32) -> Reading {
        Reading {
            rpm,
            timestamp: Utc::now() + Duration::seconds(offset_s),
            connected: true,
            ..Reading::default()
        }
    }

    #[test]
    fn test_insert_is_visible_to_next_query() {
        let repo = Repository::new();
        repo.insert_reading(reading_at(0, 2500), None).unwrap();

        let readings = repo.recent_readings(10).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].reading.rpm, 2500);
    }

    #[test]
    fn test_recent_readings_newest_first_with_limit() {
        let repo = Repository::new();
        for i in 0..5 {
            repo.insert_reading(reading_at(i, 1000 + i as i32), None).unwrap();
        }

        let readings = repo.recent_readings(3).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].reading.rpm, 1004);
        assert_eq!(readings[2].reading.rpm, 1002);
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let repo = Repository::with_capacity(3);
        for i in 0..5 {
            repo.insert_reading(reading_at(i, 1000 + i as i32), None).unwrap();
        }

        assert_eq!(repo.reading_count().unwrap(), 3);
        let readings = repo.recent_readings(10).unwrap();
        assert_eq!(readings.last().unwrap().reading.rpm, 1002);
    }

    #[test]
    fn test_readings_between() {
        let repo = Repository::new();
        repo.insert_reading(reading_at(-3600, 1000), None).unwrap();
        repo.insert_reading(reading_at(0, 2000), None).unwrap();

        let from = Utc::now() - Duration::minutes(10);
        let to = Utc::now() + Duration::minutes(10);
        let readings = repo.readings_between(from, to).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].reading.rpm, 2000);
    }

    #[test]
    fn test_readings_for_trip() {
        let repo = Repository::new();
        let trip_id = Uuid::new_v4();
        repo.insert_reading(reading_at(0, 1000), Some(trip_id)).unwrap();
        repo.insert_reading(reading_at(1, 2000), None).unwrap();
        repo.insert_reading(reading_at(2, 3000), Some(trip_id)).unwrap();

        let readings = repo.readings_for_trip(trip_id).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].reading.rpm, 1000);
        assert_eq!(readings[1].reading.rpm, 3000);
    }

    #[test]
    fn test_upsert_trip_updates_in_place() {
        let repo = Repository::new();
        let mut trip = Trip::start();
        repo.upsert_trip(trip.clone()).unwrap();

        trip.distance = 12.5;
        trip.end_time = Some(Utc::now());
        repo.upsert_trip(trip.clone()).unwrap();

        let trips = repo.trips().unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].distance, 12.5);
        assert!(repo.trip(trip.id).unwrap().end_time.is_some());
    }

    #[test]
    fn test_trip_not_found() {
        let repo = Repository::new();
        assert!(matches!(
            repo.trip(Uuid::new_v4()),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn test_delete_old_readings() {
        let repo = Repository::new();
        repo.insert_reading(reading_at(-40 * 24 * 3600, 1000), None).unwrap();
        repo.insert_reading(reading_at(0, 2000), None).unwrap();

        let removed = repo.delete_readings_older_than(Duration::days(30)).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(repo.reading_count().unwrap(), 1);
    }
}
