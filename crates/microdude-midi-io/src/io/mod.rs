//! Hardware MIDI I/O.
//!
//! Device enumeration, connection, and SysEx/CC exchange via midir.
//! Requires the `midi-io` feature.

mod port;

pub use port::{MidirBackend, MidirTransport};
