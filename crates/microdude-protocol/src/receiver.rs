//! Polling receive loop for SysEx replies.

use crate::error::ConnectorError;
use microdude_midi_io::{HexDump, IncomingMessage, Transport};
use std::time::Duration;
use tracing::{debug, error, trace};

pub const DEFAULT_RECEIVE_ATTEMPTS: u32 = 50;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for a reply: `attempts` polls, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Worst-case time spent before giving up.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RECEIVE_ATTEMPTS, DEFAULT_RETRY_INTERVAL)
    }
}

/// Poll until a SysEx message shows up and return its payload.
///
/// Non-SysEx messages polled along the way are dropped. Blocks the calling
/// thread between polls. The caller is responsible for tearing the connection
/// down when this fails.
pub fn receive_sysex<T: Transport + ?Sized>(
    transport: &mut T,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, ConnectorError> {
    for attempt in 0..policy.attempts {
        let pending = transport.poll_pending().map_err(|e| {
            error!("MIDI receive failed: {}", e);
            ConnectorError::Receive(e)
        })?;

        for message in pending {
            match message {
                IncomingMessage::SysEx(payload) => {
                    debug!("Receiving message {}...", HexDump(&payload));
                    return Ok(payload);
                }
                IncomingMessage::Other(bytes) => {
                    trace!("Ignoring non-SysEx message {}", HexDump(&bytes));
                }
            }
        }

        if attempt + 1 < policy.attempts && !policy.interval.is_zero() {
            std::thread::sleep(policy.interval);
        }
    }

    error!("No SysEx reply after {} attempts", policy.attempts);
    Err(ConnectorError::Timeout {
        attempts: policy.attempts,
    })
}
