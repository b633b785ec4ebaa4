//! MicroBrute SysEx/CC protocol.
//!
//! The [`Connector`] drives one device over a [`microdude_midi_io::Transport`]:
//! identity handshake, parameter reads and writes (persistent SysEx or
//! transient CC), and 64-step sequence transfer in 32-step fragments.
//! The [`codec`] module exposes the message builders and reply parsers on
//! their own.

pub mod error;
pub use error::{ConnectorError, Error, Result};

pub mod codec;
pub use codec::{BadHandshake, FieldMismatch, FirmwareVersion, ReplyField, Validated};

mod counter;
pub use counter::SequenceCounter;

pub mod param;
pub use param::{CcMapping, Domain, Parameter, Transform};

mod sequence;
pub use sequence::{
    Sequence, SequenceText, SequenceTextError, Step, FRAGMENT_STEPS, SEQUENCE_COUNT,
    SEQUENCE_STEPS,
};

pub mod receiver;
pub use receiver::RetryPolicy;

mod connector;
pub use connector::{ConnectionState, Connector, ConnectorConfig, WriteMode};
