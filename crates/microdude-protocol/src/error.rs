//! Error types for the protocol layer.
//!
//! [`ConnectorError`] is fatal to the current connection: it is only ever
//! returned after the connector has disconnected. Everything else leaves the
//! connection untouched.

use crate::param::Parameter;
use crate::sequence::SequenceTextError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Malformed sequence text: {0}")]
    MalformedSequenceText(#[from] SequenceTextError),

    #[error("Not connected")]
    NotConnected,

    #[error("{parameter} value {value} is outside its domain {domain}")]
    ValueOutOfRange {
        parameter: Parameter,
        value: u8,
        domain: crate::param::Domain,
    },

    #[error("No CC mapping for {parameter} value {value}")]
    Mapping { parameter: Parameter, value: u8 },

    #[error("Invalid sequence id {0} (expected 0-7)")]
    InvalidSequenceId(u8),

    #[error("Device enumeration failed: {0}")]
    Enumeration(#[source] microdude_midi_io::Error),
}

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("cannot open device: {0}")]
    Open(#[source] microdude_midi_io::Error),

    #[error("send failed: {0}")]
    Send(#[source] microdude_midi_io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] microdude_midi_io::Error),

    #[error("no SysEx reply after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("reply too short: expected at least {expected} bytes, got {actual}")]
    TruncatedReply { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
