//! Wire messages: immutable outgoing byte sequences and typed incoming messages.

use std::fmt;

const SYSEX_START: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;
const CONTROL_CHANGE: u8 = 0xB0;

/// A complete MIDI message ready to be written to a port.
///
/// Built in a single pass by one of the constructors; the bytes never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    bytes: Vec<u8>,
}

impl OutgoingMessage {
    /// Frame a SysEx payload with `F0 … F7`.
    ///
    /// Payload bytes are masked to 7 bits so a stray value can never be read
    /// as a status byte by the receiver.
    pub fn sysex(payload: &[u8]) -> Self {
        let bytes = std::iter::once(SYSEX_START)
            .chain(payload.iter().map(|b| b & 0x7F))
            .chain(std::iter::once(SYSEX_END))
            .collect();
        Self { bytes }
    }

    pub fn control_change(channel: u8, control: u8, value: u8) -> Self {
        let channel = channel.min(15); // MIDI channels are 0-15
        Self {
            bytes: vec![CONTROL_CHANGE | channel, control & 0x7F, value & 0x7F],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_sysex(&self) -> bool {
        self.bytes.first() == Some(&SYSEX_START)
    }

    /// SysEx payload without framing, or `None` for channel messages.
    pub fn sysex_payload(&self) -> Option<&[u8]> {
        if self.is_sysex() {
            let end = self.bytes.len() - 1;
            Some(&self.bytes[1..end])
        } else {
            None
        }
    }
}

impl AsRef<[u8]> for OutgoingMessage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A message observed on an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
    /// SysEx payload with the `F0`/`F7` framing stripped.
    SysEx(Vec<u8>),
    /// Any other MIDI message, raw.
    Other(Vec<u8>),
}

impl IncomingMessage {
    /// Classify raw bytes as delivered by a port callback.
    pub fn classify(bytes: &[u8]) -> Self {
        match bytes {
            [SYSEX_START, rest @ ..] => {
                let payload = match rest {
                    [body @ .., SYSEX_END] => body,
                    body => body,
                };
                IncomingMessage::SysEx(payload.to_vec())
            }
            _ => IncomingMessage::Other(bytes.to_vec()),
        }
    }

    pub fn is_sysex(&self) -> bool {
        matches!(self, IncomingMessage::SysEx(_))
    }

    pub fn into_sysex(self) -> Option<Vec<u8>> {
        match self {
            IncomingMessage::SysEx(payload) => Some(payload),
            IncomingMessage::Other(_) => None,
        }
    }
}

/// Hex dump used in trace output, e.g. `0x0, 0x20, 0x6b`.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:#x}", byte)?;
        }
        Ok(())
    }
}
