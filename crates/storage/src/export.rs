//! CSV Export
//!
//! Bulk export of stored readings to delimited text, oldest row first,
//! matching the header consumers of the export already expect.

use crate::repository::Repository;
use crate::StorageError;
use chrono::SecondsFormat;

/// Header row of the export
pub const CSV_HEADER: &str = "Timestamp,RPM,Speed (km/h),Engine Temp (°C),Fuel Level (%),Throttle Position (%),Engine Load (%),MAF (g/s),Connected";

/// Maximum rows per export
const EXPORT_LIMIT: usize = 10_000;

impl Repository {
    /// Export stored readings as CSV. Returns `None` when there is nothing
    /// to export.
    pub fn export_csv(&self) -> Result<Option<String>, StorageError> {
        let mut readings = self.recent_readings(EXPORT_LIMIT)?;
        if readings.is_empty() {
            return Ok(None);
        }
        // recent_readings is newest first; the export wants oldest first.
        readings.reverse();

        let mut csv = String::from(CSV_HEADER);
        csv.push('\n');
        for stored in &readings {
            let r = &stored.reading;
            let row = format!(
                "{},{},{},{},{:.2},{:.2},{:.2},{:.2},{}\n",
                r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                r.rpm,
                r.speed,
                r.engine_temp,
                r.fuel_level,
                r.throttle_position,
                r.engine_load,
                r.maf,
                if r.connected { "Yes" } else { "No" },
            );
            csv.push_str(&row);
        }

        Ok(Some(csv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use obd_protocol::Reading;

    #[test]
    fn test_empty_store_exports_nothing() {
        let repo = Repository::new();
        assert!(repo.export_csv().unwrap().is_none());
    }

    #[test]
    fn test_export_shape() {
        let repo = Repository::new();
        let mut reading = Reading {
            rpm: 2500,
            speed: 80,
            engine_temp: 90,
            fuel_level: 75.0,
            throttle_position: 25.0,
            engine_load: 45.0,
            maf: 12.5,
            connected: true,
            ..Reading::default()
        };
        reading.timestamp = Utc::now() - Duration::seconds(1);
        repo.insert_reading(reading.clone(), None).unwrap();
        reading.timestamp = Utc::now();
        reading.rpm = 3000;
        reading.connected = false;
        repo.insert_reading(reading, None).unwrap();

        let csv = repo.export_csv().unwrap().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        // Oldest first.
        assert!(lines[1].contains(",2500,80,90,75.00,25.00,45.00,12.50,Yes"));
        assert!(lines[2].contains(",3000,"));
        assert!(lines[2].ends_with(",No"));
    }
}
