//! Periodic PID Polling
//!
//! One cooperative task walks a fixed PID battery each tick, staggering the
//! requests so they never contend for the single-outstanding command slot.
//! Each reply updates one field of the running [`Reading`]; a field whose
//! query fails keeps its previous value for the cycle.

use crate::error::EngineError;
use crate::handle::EngineHandle;
use obd_protocol::{Pid, Reading};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// The PIDs polled every cycle, in request order
pub const POLL_BATTERY: [Pid; 5] = [
    Pid::Rpm,
    Pid::Speed,
    Pid::CoolantTemp,
    Pid::FuelLevel,
    Pid::ThrottlePosition,
];

/// Poll cycle timing
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between battery sweeps
    pub cycle_interval: Duration,
    /// Offset between consecutive requests within a sweep
    pub stagger: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_millis(500),
            stagger: Duration::from_millis(100),
        }
    }
}

/// Where the cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Between sweeps
    Idle,
    /// About to request this PID
    Request(Pid),
}

/// Sequencer for one battery sweep: `Idle` → one `Request` per PID → `Idle`
#[derive(Debug, Default)]
pub struct PollCycle {
    position: Option<usize>,
}

impl PollCycle {
    /// Start at `Idle`
    pub fn new() -> Self {
        Self::default()
    }

    /// Step to the next phase
    pub fn advance(&mut self) -> PollPhase {
        let next = match self.position {
            None => 0,
            Some(i) => i + 1,
        };
        if next < POLL_BATTERY.len() {
            self.position = Some(next);
            PollPhase::Request(POLL_BATTERY[next])
        } else {
            self.position = None;
            PollPhase::Idle
        }
    }
}

/// Periodic poller emitting one [`Reading`] per completed sweep
pub struct Poller {
    handle: EngineHandle,
    config: PollerConfig,
    readings_tx: mpsc::Sender<Reading>,
    reading: Reading,
}

impl Poller {
    /// Create a poller over a spawned engine
    pub fn new(
        handle: EngineHandle,
        config: PollerConfig,
        readings_tx: mpsc::Sender<Reading>,
    ) -> Self {
        Self {
            handle,
            config,
            readings_tx,
            reading: Reading::default(),
        }
    }

    /// Run until the engine goes away or every reading consumer is dropped
    pub async fn run(mut self) {
        info!("starting poll cycle");
        let mut interval = tokio::time::interval(self.config.cycle_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle = PollCycle::new();

        loop {
            interval.tick().await;

            let mut any_reply = false;
            let mut first_request = true;
            loop {
                let pid = match cycle.advance() {
                    PollPhase::Idle => break,
                    PollPhase::Request(pid) => pid,
                };

                // Stagger each request off the previous one; the last
                // reply flows straight to emission.
                if !first_request {
                    tokio::time::sleep(self.config.stagger).await;
                }
                first_request = false;

                match self.handle.query(pid).await {
                    Ok(value) => {
                        any_reply = true;
                        self.reading.apply(pid, value);
                    }
                    Err(EngineError::Disconnected) => {
                        warn!("engine gone, stopping poll cycle");
                        return;
                    }
                    Err(e) => {
                        // Partial-update semantics: the field keeps its
                        // previous value this cycle.
                        debug!(pid = ?pid, error = %e, "field not updated");
                    }
                }
            }

            self.reading.connected = any_reply;
            // Emission is best-effort: a slow consumer loses readings, a
            // dropped one stops the cycle.
            if self.readings_tx.try_send(self.reading.clone()).is_err()
                && self.readings_tx.is_closed()
            {
                info!("reading consumer dropped, stopping poll cycle");
                return;
            }
        }
    }
}
