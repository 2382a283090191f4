//! Command Engine Implementation
//!
//! One engine per connected adapter. Every exchange is send-then-await: the
//! command goes out, received fragments feed the framer until a full frame
//! arrives or the timeout fires. The `&mut self` receiver makes the
//! single-outstanding-command invariant structural; concurrent callers are
//! serialized by the [`crate::EngineHandle`] queue.

use crate::error::EngineError;
use crate::transport::Transport;
use obd_protocol::{parse_dtc_reply, Command, DtcCode, Pid, ResponseFramer, INIT_SEQUENCE};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Default per-command reply timeout
const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Settle delay between initialization directives
const DEFAULT_INIT_SETTLE_MS: u64 = 100;

/// Engine timing configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long to wait for a reply before failing the exchange
    pub command_timeout: Duration,
    /// Delay between initialization directives to let the adapter settle
    pub init_settle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            init_settle: Duration::from_millis(DEFAULT_INIT_SETTLE_MS),
        }
    }
}

/// Command engine for one ELM327-compatible adapter
pub struct CommandEngine<T: Transport> {
    link: T,
    rx: mpsc::Receiver<Vec<u8>>,
    framer: ResponseFramer,
    config: EngineConfig,
    initialized: bool,
}

impl<T: Transport> CommandEngine<T> {
    /// Create an engine over an outbound link and its inbound byte stream
    pub fn new(link: T, rx: mpsc::Receiver<Vec<u8>>, config: EngineConfig) -> Self {
        Self {
            link,
            rx,
            framer: ResponseFramer::new(),
            config,
            initialized: false,
        }
    }

    /// Send one command and await its framed reply.
    ///
    /// Fails with [`EngineError::TransportUnavailable`] when no adapter is
    /// connected, [`EngineError::Timeout`] when the adapter never replies,
    /// and [`EngineError::Disconnected`] when the inbound stream closes
    /// mid-exchange. A failed exchange resets the framer so no stale bytes
    /// leak into the next command's frame.
    pub async fn send_command(&mut self, command: &Command) -> Result<String, EngineError> {
        if !self.link.is_connected() {
            return Err(EngineError::TransportUnavailable);
        }

        // No frame may span two commands: drop any partial frame and any
        // late reply a timed-out exchange left in the inbound channel.
        self.framer.reset();
        while self.rx.try_recv().is_ok() {}
        self.link.write(&command.wire_bytes())?;

        let deadline = Instant::now() + self.config.command_timeout;
        loop {
            let chunk = match timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => {
                    warn!(command = %command, "transport closed mid-exchange");
                    self.framer.reset();
                    return Err(EngineError::Disconnected);
                }
                Err(_) => {
                    warn!(command = %command, "no reply within timeout");
                    self.framer.reset();
                    return Err(EngineError::Timeout(
                        self.config.command_timeout.as_millis() as u64,
                    ));
                }
            };

            if let Some(frame) = self.framer.feed(&chunk) {
                debug!(command = %command, reply = %frame, "exchange complete");
                return Ok(frame);
            }
        }
    }

    /// Run the ELM327 initialization handshake.
    ///
    /// Each directive must get a reply before the next is sent; the first
    /// failure aborts the remaining steps without retrying.
    pub async fn initialize(&mut self) -> Result<(), EngineError> {
        info!("initializing adapter");
        for directive in INIT_SEQUENCE {
            let command = Command::at(directive);
            if let Err(e) = self.send_command(&command).await {
                warn!(directive, error = %e, "initialization aborted");
                return Err(EngineError::InitializationFailed {
                    directive: directive.to_string(),
                });
            }
            tokio::time::sleep(self.config.init_settle).await;
        }
        self.initialized = true;
        info!("adapter initialized");
        Ok(())
    }

    /// Query one PID and decode its reply
    pub async fn query_pid(&mut self, pid: Pid) -> Result<f64, EngineError> {
        let reply = self.send_command(&pid.request()).await?;
        Ok(pid.decode_reply(&reply)?)
    }

    /// Read stored diagnostic trouble codes. Transport failure yields an
    /// empty list rather than an error.
    pub async fn read_dtcs(&mut self) -> Vec<DtcCode> {
        match self.send_command(&Command::read_dtcs()).await {
            Ok(reply) => parse_dtc_reply(&reply),
            Err(e) => {
                warn!(error = %e, "DTC read failed");
                Vec::new()
            }
        }
    }

    /// Clear stored trouble codes. Success means "the adapter replied",
    /// not that the codes were verified gone.
    pub async fn clear_dtcs(&mut self) -> bool {
        self.send_command(&Command::clear_dtcs()).await.is_ok()
    }

    /// Whether the initialization handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Drop any in-progress frame, e.g. after an external disconnect
    /// notification.
    pub fn reset(&mut self) {
        self.framer.reset();
        self.initialized = false;
    }
}
