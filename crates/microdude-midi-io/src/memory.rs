//! In-process transport for tests, demos and offline use.
//!
//! A [`MemoryDevice`] plays the role of the hardware: it records everything
//! the host sends and hands back queued or computed replies when polled.
//! Faults can be injected on open, send and poll.

use crate::error::{Error, Result};
use crate::message::{IncomingMessage, OutgoingMessage};
use crate::transport::{Backend, Transport};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type Responder = Box<dyn FnMut(&OutgoingMessage) -> Vec<IncomingMessage> + Send>;

#[derive(Default)]
struct DeviceState {
    sent: Vec<OutgoingMessage>,
    /// (poll number at which the message becomes visible, message)
    inbox: VecDeque<(usize, IncomingMessage)>,
    responder: Option<Responder>,
    latency_polls: usize,
    polls: usize,
    open: bool,
    opens: usize,
    closes: usize,
    fail_open: bool,
    fail_send: bool,
    /// Sends left before every further send fails.
    send_budget: Option<usize>,
    fail_poll: bool,
}

/// Shared handle to a simulated device. Clones observe the same state.
#[derive(Clone, Default)]
pub struct MemoryDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for delivery on a later poll.
    pub fn push_incoming(&self, message: IncomingMessage) {
        let mut state = self.state.lock();
        let ready_at = state.polls + state.latency_polls;
        state.inbox.push_back((ready_at, message));
    }

    pub fn push_sysex(&self, payload: impl Into<Vec<u8>>) {
        self.push_incoming(IncomingMessage::SysEx(payload.into()));
    }

    /// Compute replies for every message the host sends.
    pub fn respond_with<F>(&self, responder: F)
    where
        F: FnMut(&OutgoingMessage) -> Vec<IncomingMessage> + Send + 'static,
    {
        self.state.lock().responder = Some(Box::new(responder));
    }

    /// Number of empty polls before a queued message becomes visible.
    pub fn set_latency(&self, polls: usize) {
        self.state.lock().latency_polls = polls;
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.lock().fail_open = fail;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().fail_send = fail;
    }

    /// Let `count` more sends through, then fail every send after them.
    pub fn fail_sends_after(&self, count: usize) {
        self.state.lock().send_budget = Some(count);
    }

    pub fn fail_polls(&self, fail: bool) {
        self.state.lock().fail_poll = fail;
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.state.lock().sent.clone()
    }

    /// Payloads of the SysEx messages sent so far, without framing.
    pub fn sent_sysex(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .sent
            .iter()
            .filter_map(|m| m.sysex_payload().map(<[u8]>::to_vec))
            .collect()
    }

    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }

    pub fn poll_count(&self) -> usize {
        self.state.lock().polls
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().opens
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }
}

/// Backend serving a fixed set of named [`MemoryDevice`]s.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    devices: Arc<Mutex<Vec<(String, MemoryDevice)>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device under `name`, returning its handle.
    pub fn add_device(&self, name: impl Into<String>) -> MemoryDevice {
        let device = MemoryDevice::new();
        self.devices.lock().push((name.into(), device.clone()));
        device
    }

    pub fn device(&self, name: &str) -> Option<MemoryDevice> {
        self.devices
            .lock()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.clone())
    }
}

impl Backend for MemoryBackend {
    type Transport = MemoryTransport;

    fn open(&self, device: &str) -> Result<MemoryTransport> {
        let handle = self
            .device(device)
            .ok_or_else(|| Error::DeviceNotFound(device.to_string()))?;
        {
            let mut state = handle.state.lock();
            if state.fail_open {
                return Err(Error::MidiPort(format!("cannot open '{}'", device)));
            }
            state.open = true;
            state.opens += 1;
        }
        Ok(MemoryTransport { device: handle })
    }

    fn list_devices(&self) -> Result<Vec<String>> {
        Ok(self.devices.lock().iter().map(|(n, _)| n.clone()).collect())
    }
}

pub struct MemoryTransport {
    device: MemoryDevice,
}

impl MemoryTransport {
    pub fn device(&self) -> &MemoryDevice {
        &self.device
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, message: &OutgoingMessage) -> Result<()> {
        let responder = {
            let mut state = self.device.state.lock();
            if state.fail_send || state.send_budget == Some(0) {
                return Err(Error::Send("injected send failure".to_string()));
            }
            if let Some(budget) = state.send_budget.as_mut() {
                *budget -= 1;
            }
            state.sent.push(message.clone());
            state.responder.take()
        };
        let Some(mut responder) = responder else {
            return Ok(());
        };

        // Unlocked while the responder runs; it may call back into the device.
        let replies = responder(message);

        let mut state = self.device.state.lock();
        if state.responder.is_none() {
            state.responder = Some(responder);
        }
        let ready_at = state.polls + state.latency_polls;
        state
            .inbox
            .extend(replies.into_iter().map(|reply| (ready_at, reply)));
        Ok(())
    }

    fn poll_pending(&mut self) -> Result<Vec<IncomingMessage>> {
        let mut state = self.device.state.lock();
        if state.fail_poll {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "injected poll failure",
            )));
        }
        state.polls += 1;
        let polls = state.polls;

        let mut ready = Vec::new();
        while state.inbox.front().is_some_and(|(at, _)| *at < polls) {
            if let Some((_, message)) = state.inbox.pop_front() {
                ready.push(message);
            }
        }
        Ok(ready)
    }

    fn close(self) -> Result<()> {
        let mut state = self.device.state.lock();
        state.open = false;
        state.closes += 1;
        Ok(())
    }
}
