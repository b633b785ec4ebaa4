//! # MicroDude - Arturia MicroBrute editor backend
//!
//! Reads and writes the MicroBrute's sequencer and global settings over MIDI.
//!
//! ## Architecture
//!
//! MicroDude is an umbrella crate that coordinates:
//! - **microdude-midi-io** - MIDI transport (midir ports, in-memory device, message framing)
//! - **microdude-protocol** - SysEx/CC codec, sequence counter, parameter table, connector
//!
//! On top of those it keeps the persisted device choice ([`config`]), the
//! `.mbseq` sequence dump format ([`sequence_file`]) and the [`Editor`]
//! session tying them together.
//!
//! ## Quick Start
//!
//! ```ignore
//! use microdude::prelude::*;
//!
//! let mut connector = Connector::new(MidirBackend::new());
//! connector.connect("MicroBrute MIDI 1")?;
//!
//! connector.set_parameter(Parameter::NotePriority, 2, WriteMode::Persistent)?;
//! let first = connector.get_sequence(0)?;
//! connector.set_sequence("2:40 52 x 64")?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Hardware MIDI
//! - `midi-hardware` - midir backend; without it only [`MemoryBackend`] is available

/// Re-export of microdude-midi-io for direct access
pub use microdude_midi_io as midi_io;

/// Re-export of microdude-protocol for direct access
pub use microdude_protocol as protocol;

pub use microdude_midi_io::{
    Backend, IncomingMessage, MemoryBackend, MemoryDevice, OutgoingMessage, Transport,
};

#[cfg(feature = "midi-hardware")]
pub use microdude_midi_io::{MidirBackend, MidirTransport};

pub use microdude_protocol::{
    ConnectionState, Connector, ConnectorConfig, ConnectorError, FirmwareVersion, Parameter,
    RetryPolicy, Sequence, SequenceCounter, SequenceText, Step, WriteMode,
};

pub mod config;
pub use config::{ConfigStore, EditorConfig};

pub mod sequence_file;

mod editor;
pub use editor::{Editor, EditorBuilder};

mod error;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{ConfigStore, Editor, EditorConfig, Error, Result};

    // Transport
    pub use crate::midi_io::{Backend, MemoryBackend};
    #[cfg(feature = "midi-hardware")]
    pub use crate::midi_io::MidirBackend;

    // Protocol
    pub use crate::protocol::{
        ConnectionState, Connector, ConnectorConfig, Parameter, RetryPolicy, WriteMode,
    };
}
