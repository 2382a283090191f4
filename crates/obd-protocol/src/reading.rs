//! Decoded Vehicle Reading
//!
//! One snapshot of the polled telemetry. Fields update independently as PID
//! replies arrive; a field that fails to decode in a cycle keeps its
//! previous value rather than being zeroed.

use crate::pid::Pid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decoded telemetry snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Engine RPM (rev/min)
    pub rpm: i32,
    /// Vehicle speed (km/h)
    pub speed: i32,
    /// Coolant temperature (°C, signed)
    pub engine_temp: i32,
    /// Fuel tank level (0-100 %)
    pub fuel_level: f64,
    /// Throttle position (0-100 %)
    pub throttle_position: f64,
    /// Calculated engine load (0-100 %)
    pub engine_load: f64,
    /// Mass air flow (g/s)
    pub maf: f64,
    /// When the snapshot was last updated
    pub timestamp: DateTime<Utc>,
    /// Whether an adapter was connected when the snapshot was taken
    pub connected: bool,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            rpm: 0,
            speed: 0,
            engine_temp: 0,
            fuel_level: 0.0,
            throttle_position: 0.0,
            engine_load: 0.0,
            maf: 0.0,
            timestamp: Utc::now(),
            connected: false,
        }
    }
}

impl Reading {
    /// Apply one decoded PID value to the matching field
    pub fn apply(&mut self, pid: Pid, value: f64) {
        match pid {
            Pid::Rpm => self.rpm = value as i32,
            Pid::Speed => self.speed = value as i32,
            Pid::CoolantTemp => self.engine_temp = value as i32,
            Pid::FuelLevel => self.fuel_level = value,
            Pid::ThrottlePosition => self.throttle_position = value,
            Pid::EngineLoad => self.engine_load = value,
            Pid::Maf => self.maf = value,
        }
        self.timestamp = Utc::now();
    }
}
