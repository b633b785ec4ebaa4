//! MIDI transport for the MicroDude editor.
//!
//! Provides the [`Transport`]/[`Backend`] seam the protocol layer talks through,
//! typed wire messages, a hardware backend over midir and an in-memory backend.
//!
//! Feature gates: `midi-io` (hardware ports via midir, on by default).

pub mod error;
pub use error::{Error, Result};

mod message;
pub use message::{HexDump, IncomingMessage, OutgoingMessage};

mod transport;
pub use transport::{Backend, Transport};

pub mod memory;
pub use memory::{MemoryBackend, MemoryDevice, MemoryTransport};

#[cfg(feature = "midi-io")]
pub(crate) mod io;

#[cfg(feature = "midi-io")]
pub use io::{MidirBackend, MidirTransport};
