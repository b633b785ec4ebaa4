//! Connection state machine for one MicroBrute.
//!
//! ## Quick Start
//!
//! ```ignore
//! use microdude_protocol::{Connector, Parameter, WriteMode};
//! use microdude_midi_io::MidirBackend;
//!
//! let mut connector = Connector::new(MidirBackend::new());
//! connector.connect("MicroBrute MIDI 1")?;
//! if connector.is_connected() {
//!     let range = connector.get_parameter(Parameter::BendRange)?;
//!     connector.set_parameter(Parameter::BendRange, 12, WriteMode::Transient)?;
//!     let line = connector.get_sequence(0)?;
//! }
//! ```
//!
//! Requests are strictly half-duplex: one request, one reply, then the next
//! request. Any transport fault disconnects before the error is returned.

use crate::codec::{self, FirmwareVersion, Validated};
use crate::counter::SequenceCounter;
use crate::error::{ConnectorError, Error, Result};
use crate::param::Parameter;
use crate::receiver::{self, RetryPolicy};
use crate::sequence::{Sequence, SequenceText, FRAGMENT_STEPS, SEQUENCE_COUNT, SEQUENCE_STEPS};
use microdude_midi_io::{Backend, HexDump, OutgoingMessage, Transport};
use tracing::{debug, error, info, warn};

const MAX_CHANNEL: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Transport open, handshake not yet answered.
    Connecting,
    Connected,
}

/// Which wire path a parameter write takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// SysEx write stored in device memory. Not acknowledged.
    Persistent,
    /// CC write affecting live behavior only.
    Transient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub retry: RetryPolicy,
    /// Read the receive channel right after the handshake so CC writes
    /// target the right channel.
    pub query_channel_on_connect: bool,
}

impl ConnectorConfig {
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn query_channel_on_connect(mut self, enabled: bool) -> Self {
        self.query_channel_on_connect = enabled;
        self
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            query_channel_on_connect: true,
        }
    }
}

pub struct Connector<B: Backend> {
    backend: B,
    config: ConnectorConfig,
    transport: Option<B::Transport>,
    counter: SequenceCounter,
    channel: u8,
    firmware: Option<FirmwareVersion>,
}

impl<B: Backend> Connector<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, ConnectorConfig::default())
    }

    pub fn with_config(backend: B, config: ConnectorConfig) -> Self {
        Self {
            backend,
            config,
            transport: None,
            counter: SequenceCounter::default(),
            channel: 0,
            firmware: None,
        }
    }

    // ==================== State ====================

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        match (&self.transport, self.firmware) {
            (None, _) => ConnectionState::Disconnected,
            (Some(_), None) => ConnectionState::Connecting,
            (Some(_), Some(_)) => ConnectionState::Connected,
        }
    }

    pub fn firmware_version(&self) -> Option<FirmwareVersion> {
        self.firmware
    }

    /// MIDI channel (0-15) used by transient writes.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn counter(&self) -> SequenceCounter {
        self.counter
    }

    /// Resynchronise the rolling counter, e.g. after the device was power-cycled.
    pub fn set_counter(&mut self, counter: SequenceCounter) {
        self.counter = counter;
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn list_devices(&self) -> Result<Vec<String>> {
        self.backend.list_devices().map_err(Error::Enumeration)
    }

    // ==================== Connection ====================

    /// Open `device` and run the identity handshake.
    ///
    /// A device that answers with the wrong identity is not an error: the
    /// connection is torn down and [`is_connected`](Self::is_connected)
    /// reports `false`.
    pub fn connect(&mut self, device: &str) -> Result<()> {
        if self.is_connected() {
            self.disconnect();
        }

        debug!("Connecting to '{}'...", device);
        let transport = self.backend.open(device).map_err(|e| {
            error!("Cannot open '{}': {}", device, e);
            ConnectorError::Open(e)
        })?;
        self.transport = Some(transport);

        debug!("Handshaking...");
        self.send(&codec::handshake_request())?;
        let reply = self.receive()?;
        match codec::parse_handshake_reply(&reply) {
            Ok(version) => {
                info!("Handshake ok. Version {}.", version);
                self.firmware = Some(version);
            }
            Err(e) => {
                warn!("Bad handshake ({}). Disconnecting...", e);
                self.disconnect();
                return Ok(());
            }
        }

        if self.config.query_channel_on_connect {
            let channel = self.get_parameter(Parameter::RxChannel)?;
            self.cache_channel(channel);
            debug!("Active MIDI channel: {}", self.channel);
        }
        Ok(())
    }

    /// Close the transport and forget all connection state. Idempotent.
    pub fn disconnect(&mut self) {
        if let Some(transport) = self.transport.take() {
            debug!("Disconnecting...");
            if let Err(e) = transport.close() {
                error!("Error while disconnecting: {}", e);
            }
        }
        self.counter = SequenceCounter::default();
        self.channel = 0;
        self.firmware = None;
    }

    // ==================== Parameters ====================

    pub fn get_parameter(&mut self, parameter: Parameter) -> Result<u8> {
        Ok(self.read_parameter(parameter)?.into_value())
    }

    /// Like [`get_parameter`](Self::get_parameter), keeping the reply-field
    /// mismatches.
    pub fn read_parameter(&mut self, parameter: Parameter) -> Result<Validated<u8>> {
        self.ensure_connected()?;
        self.send(&codec::get_parameter_request(self.counter, parameter))?;
        let reply = self.receive()?;
        let parsed = codec::parse_parameter_reply(&reply, self.counter, parameter);
        self.counter.advance();
        parsed.map_err(|e| self.fault(e))
    }

    /// Every parameter, in [`Parameter::ALL`] order.
    pub fn read_all_parameters(&mut self) -> Result<Vec<(Parameter, u8)>> {
        debug!("Loading status...");
        let mut values = Vec::with_capacity(Parameter::ALL.len());
        for parameter in Parameter::ALL {
            values.push((parameter, self.get_parameter(parameter)?));
        }
        Ok(values)
    }

    pub fn set_parameter(&mut self, parameter: Parameter, value: u8, mode: WriteMode) -> Result<()> {
        self.ensure_connected()?;
        let domain = parameter.domain();
        if !domain.contains(value) {
            return Err(Error::ValueOutOfRange {
                parameter,
                value,
                domain,
            });
        }

        match mode {
            WriteMode::Persistent => {
                self.send(&codec::set_parameter_request(self.counter, parameter, value))?;
                self.counter.advance();
            }
            WriteMode::Transient => {
                for message in codec::transient_parameter_messages(self.channel, parameter, value)? {
                    self.send(&message)?;
                }
            }
        }

        if parameter == Parameter::RxChannel {
            self.cache_channel(value);
        }
        Ok(())
    }

    fn cache_channel(&mut self, value: u8) {
        self.channel = if value <= MAX_CHANNEL { value } else { 0 };
    }

    // ==================== Sequences ====================

    /// Sequence `seq_id` (0-7) rendered as a text line.
    pub fn get_sequence(&mut self, seq_id: u8) -> Result<String> {
        Ok(self.read_sequence(seq_id)?.to_text())
    }

    pub fn read_sequence(&mut self, seq_id: u8) -> Result<Sequence> {
        self.ensure_connected()?;
        if seq_id >= SEQUENCE_COUNT {
            return Err(Error::InvalidSequenceId(seq_id));
        }

        let mut bytes = Vec::with_capacity(SEQUENCE_STEPS);
        for offset in [0, FRAGMENT_STEPS as u8] {
            bytes.extend(self.get_sequence_fragment(seq_id, offset)?.value);
        }
        Ok(Sequence::from_wire(seq_id, &bytes))
    }

    fn get_sequence_fragment(
        &mut self,
        seq_id: u8,
        offset: u8,
    ) -> Result<Validated<[u8; FRAGMENT_STEPS]>> {
        self.send(&codec::get_sequence_fragment_request(
            self.counter,
            seq_id,
            offset,
        ))?;
        let reply = self.receive()?;
        let parsed = codec::parse_sequence_fragment_reply(&reply, self.counter, seq_id, offset);
        self.counter.advance();
        parsed.map_err(|e| self.fault(e))
    }

    /// Write one sequence line.
    ///
    /// The line is parsed before anything is sent. Fragments are written in
    /// order; a fault on the second leaves the first applied on the device.
    pub fn set_sequence(&mut self, line: &str) -> Result<()> {
        let text = SequenceText::parse(line)?;
        self.write_sequence(&text)
    }

    pub fn write_sequence(&mut self, text: &SequenceText) -> Result<()> {
        self.ensure_connected()?;
        for (offset, steps) in text.fragments() {
            self.send(&codec::set_sequence_fragment_request(
                self.counter,
                text.id(),
                offset,
                steps,
            ))?;
            self.counter.advance();
        }
        Ok(())
    }

    /// All eight sequences as text lines, in id order.
    pub fn get_all_sequences(&mut self) -> Result<Vec<String>> {
        (0..SEQUENCE_COUNT).map(|id| self.get_sequence(id)).collect()
    }

    /// Write several lines. Every line is parsed before the first is sent.
    pub fn set_sequences<'a, I>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let texts = lines
            .into_iter()
            .map(SequenceText::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        texts.iter().try_for_each(|text| self.write_sequence(text))
    }

    // ==================== Transport ====================

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    fn send(&mut self, message: &OutgoingMessage) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        debug!("Sending message {}...", HexDump(message.bytes()));
        if let Err(e) = transport.send(message) {
            error!("MIDI send failed: {}", e);
            return Err(self.fault(ConnectorError::Send(e)));
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        receiver::receive_sysex(transport, &self.config.retry).map_err(|e| self.fault(e))
    }

    /// Disconnect, then hand back the error for the caller.
    fn fault(&mut self, e: ConnectorError) -> Error {
        self.disconnect();
        e.into()
    }
}

impl<B: Backend> Drop for Connector<B> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
