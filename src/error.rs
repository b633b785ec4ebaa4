//! Centralized error type for the microdude umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Protocol(#[from] microdude_protocol::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] microdude_midi_io::Error),

    #[error("Config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("no home directory to keep the configuration in")]
    NoHomeDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
