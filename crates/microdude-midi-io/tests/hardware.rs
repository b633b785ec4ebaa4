//! Hardware tests against a real MicroBrute (or any device answering the
//! universal identity request).
//!
//! All tests are `#[ignore]` so CI doesn't fail without hardware.
//!
//! Run with:
//!   MICRODUDE_DEVICE="MicroBrute MIDI 1" cargo test -p microdude-midi-io --test hardware -- --ignored --test-threads=1

#![cfg(feature = "midi-io")]

use std::thread;
use std::time::Duration;
use microdude_midi_io::{Backend, IncomingMessage, MidirBackend, OutgoingMessage, Transport};

const IDENTITY_REQUEST: [u8; 4] = [0x7E, 0x7F, 0x06, 0x01];
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn device_name() -> String {
    std::env::var("MICRODUDE_DEVICE").unwrap_or_else(|_| "MicroBrute".to_string())
}

#[test]
#[ignore]
fn test_device_is_listed() {
    let devices = MidirBackend::new().list_devices().unwrap();
    assert!(
        devices.contains(&device_name()),
        "device not found, visible: {:?}",
        devices
    );
}

#[test]
#[ignore]
fn test_identity_reply() {
    let mut transport = MidirBackend::new()
        .open(&device_name())
        .expect("Failed to open device");

    transport
        .send(&OutgoingMessage::sysex(&IDENTITY_REQUEST))
        .unwrap();

    let mut reply = None;
    for _ in 0..50 {
        if let Some(payload) = transport
            .poll_pending()
            .unwrap()
            .into_iter()
            .find_map(IncomingMessage::into_sysex)
        {
            reply = Some(payload);
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    let reply = reply.expect("No SysEx reply within 5 s");
    assert_eq!(&reply[0..4], &[0x7E, 0x01, 0x06, 0x02]);
    transport.close().unwrap();
}
