//! Transport seam between the protocol layer and concrete MIDI ports.

use crate::error::Result;
use crate::message::{IncomingMessage, OutgoingMessage};

/// An open, bidirectional connection to one device.
pub trait Transport {
    fn send(&mut self, message: &OutgoingMessage) -> Result<()>;

    /// Drain the messages that arrived since the last poll. Never blocks.
    fn poll_pending(&mut self) -> Result<Vec<IncomingMessage>>;

    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens transports by device name and lists the names it can open.
pub trait Backend {
    type Transport: Transport;

    fn open(&self, device: &str) -> Result<Self::Transport>;

    fn list_devices(&self) -> Result<Vec<String>>;
}

impl<B: Backend + ?Sized> Backend for &B {
    type Transport = B::Transport;

    fn open(&self, device: &str) -> Result<Self::Transport> {
        (**self).open(device)
    }

    fn list_devices(&self) -> Result<Vec<String>> {
        (**self).list_devices()
    }
}
