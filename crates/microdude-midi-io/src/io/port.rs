//! midir-backed transport: one input and one output connection to the same device.

use crate::error::{Error, Result};
use crate::message::{HexDump, IncomingMessage, OutgoingMessage};
use crate::transport::{Backend, Transport};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, trace};

const DEFAULT_CLIENT_NAME: &str = "microdude";

/// Opens hardware ports through the platform MIDI API.
#[derive(Debug, Clone)]
pub struct MidirBackend {
    client_name: String,
}

impl MidirBackend {
    pub fn new() -> Self {
        Self::with_client_name(DEFAULT_CLIENT_NAME)
    }

    pub fn with_client_name(name: impl Into<String>) -> Self {
        Self {
            client_name: name.into(),
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MidirBackend {
    type Transport = MidirTransport;

    fn open(&self, device: &str) -> Result<MidirTransport> {
        let mut midi_input = MidiInput::new(&format!("{}-in", self.client_name))?;
        midi_input.ignore(Ignore::None);
        let midi_output = MidiOutput::new(&format!("{}-out", self.client_name))?;

        let in_port = port_by_name(&midi_input, device)?;
        let out_port = port_by_name(&midi_output, device)?;

        let (sender, incoming) = unbounded();
        let input = midi_input.connect(
            &in_port,
            "microdude-input",
            |_timestamp, bytes, sender: &mut Sender<IncomingMessage>| {
                trace!("MIDI input: {}", HexDump(bytes));
                // The receiver only goes away together with this connection.
                let _ = sender.send(IncomingMessage::classify(bytes));
            },
            sender,
        )?;
        let output = midi_output.connect(&out_port, "microdude-output")?;

        debug!("Opened MIDI device '{}'", device);
        Ok(MidirTransport {
            device: device.to_string(),
            input,
            output,
            incoming,
        })
    }

    fn list_devices(&self) -> Result<Vec<String>> {
        let midi_input = MidiInput::new(&format!("{}-list-in", self.client_name))?;
        let midi_output = MidiOutput::new(&format!("{}-list-out", self.client_name))?;

        let outputs = port_names(&midi_output);
        Ok(port_names(&midi_input)
            .into_iter()
            .filter(|name| outputs.contains(name))
            .collect())
    }
}

/// An open device: output connection for requests, input connection feeding a queue.
pub struct MidirTransport {
    device: String,
    input: MidiInputConnection<Sender<IncomingMessage>>,
    output: MidiOutputConnection,
    incoming: Receiver<IncomingMessage>,
}

impl MidirTransport {
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl Transport for MidirTransport {
    fn send(&mut self, message: &OutgoingMessage) -> Result<()> {
        self.output.send(message.bytes())?;
        Ok(())
    }

    fn poll_pending(&mut self) -> Result<Vec<IncomingMessage>> {
        let mut pending = Vec::new();
        loop {
            match self.incoming.try_recv() {
                Ok(message) => pending.push(message),
                Err(TryRecvError::Empty) => return Ok(pending),
                Err(TryRecvError::Disconnected) if pending.is_empty() => {
                    return Err(Error::Closed)
                }
                Err(TryRecvError::Disconnected) => return Ok(pending),
            }
        }
    }

    fn close(self) -> Result<()> {
        debug!("Closing MIDI device '{}'", self.device);
        let _ = self.input.close();
        let _ = self.output.close();
        Ok(())
    }
}

fn port_by_name<IO: MidiIO>(io: &IO, name: &str) -> Result<IO::Port> {
    for port in io.ports() {
        match io.port_name(&port) {
            Ok(port_name) if port_name == name => return Ok(port),
            Ok(_) => {}
            Err(e) => debug!("Skipping unnamed MIDI port: {}", e),
        }
    }
    Err(Error::DeviceNotFound(name.to_string()))
}

fn port_names<IO: MidiIO>(io: &IO) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}
