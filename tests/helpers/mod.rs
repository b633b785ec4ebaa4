//! Test helpers for MicroDude integration tests.
//!
//! [`simulated_microbrute`] registers a device on a [`MemoryBackend`] that
//! answers the way the hardware does, backed by plain memory the test can
//! inspect.

#![allow(dead_code)]

use microdude::protocol::codec::{HANDSHAKE_REPLY_PREFIX, HANDSHAKE_REQUEST, VENDOR_PREFIX};
use microdude::{ConnectorConfig, IncomingMessage, MemoryBackend, MemoryDevice, RetryPolicy};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEVICE: &str = "MicroBrute MIDI 1";

pub struct DeviceMemory {
    pub parameters: [u8; 0x40],
    pub sequences: [[u8; 64]; 8],
}

pub type SharedMemory = Arc<Mutex<DeviceMemory>>;

pub fn fast_connector_config() -> ConnectorConfig {
    ConnectorConfig::default().retry(RetryPolicy::new(50, Duration::ZERO))
}

pub fn simulated_microbrute(backend: &MemoryBackend, name: &str) -> (MemoryDevice, SharedMemory) {
    let device = backend.add_device(name);
    let memory = Arc::new(Mutex::new(DeviceMemory {
        parameters: [0; 0x40],
        sequences: [[0; 64]; 8],
    }));
    let shared = Arc::clone(&memory);

    device.respond_with(move |message| {
        let Some(payload) = message.sysex_payload() else {
            return Vec::new();
        };
        if payload == &HANDSHAKE_REQUEST[..] {
            let mut reply = HANDSHAKE_REPLY_PREFIX.to_vec();
            reply.extend([1, 0, 0, 8]);
            return vec![IncomingMessage::SysEx(reply)];
        }
        if !payload.starts_with(&VENDOR_PREFIX) {
            return Vec::new();
        }

        let mut memory = shared.lock().unwrap();
        let mut reply = payload[..6].to_vec();
        match &payload[6..] {
            [0x00, id_plus_one] => {
                let id = id_plus_one - 1;
                reply.extend([0x01, id, memory.parameters[id as usize]]);
                vec![IncomingMessage::SysEx(reply)]
            }
            [0x01, id, value] => {
                memory.parameters[*id as usize] = *value;
                Vec::new()
            }
            [0x03, 0x3B, seq, offset, 0x20] => {
                let start = *offset as usize;
                reply.extend([0x23, 0x3A, *seq, *offset, 0x20]);
                reply.extend(&memory.sequences[*seq as usize][start..start + 32]);
                vec![IncomingMessage::SysEx(reply)]
            }
            [0x23, 0x3A, seq, offset, _len, steps @ ..] => {
                let start = *offset as usize;
                memory.sequences[*seq as usize][start..start + 32].copy_from_slice(steps);
                Vec::new()
            }
            _ => Vec::new(),
        }
    });

    (device, memory)
}
