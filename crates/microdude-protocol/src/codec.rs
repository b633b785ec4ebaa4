//! MicroBrute message codec.
//!
//! Builders return complete [`OutgoingMessage`]s; parsers take the SysEx
//! payload of a reply (framing already stripped by the transport).
//!
//! Vendor request layout: `00 20 6B 05 01 <counter> <opcode…> <body…>`.
//! Reply fields that do not match the request are reported, not rejected:
//! see [`Validated`].

use crate::counter::SequenceCounter;
use crate::error::{ConnectorError, Error};
use crate::param::{Parameter, DATA_ENTRY_LSB, DATA_ENTRY_MSB, RPN_LSB, RPN_MSB};
use crate::sequence::{Step, FRAGMENT_STEPS};
use microdude_midi_io::OutgoingMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

pub const VENDOR_PREFIX: [u8; 5] = [0x00, 0x20, 0x6B, 0x05, 0x01];
pub const HANDSHAKE_REQUEST: [u8; 4] = [0x7E, 0x7F, 0x06, 0x01];
pub const HANDSHAKE_REPLY_PREFIX: [u8; 11] =
    [0x7E, 0x01, 0x06, 0x02, 0x00, 0x20, 0x6B, 0x04, 0x00, 0x02, 0x01];

pub const OP_GET_PARAMETER: u8 = 0x00;
pub const OP_SET_PARAMETER: u8 = 0x01;
pub const OP_GET_SEQUENCE: [u8; 2] = [0x03, 0x3B];
pub const OP_SET_SEQUENCE: [u8; 2] = [0x23, 0x3A];
pub const FRAGMENT_LENGTH: u8 = 0x20;

const COUNTER_INDEX: usize = VENDOR_PREFIX.len();
const VERSION_RANGE: std::ops::Range<usize> = 11..15;
const PARAMETER_REPLY_LEN: usize = 9;
const FRAGMENT_PAYLOAD_START: usize = 11;
const FRAGMENT_REPLY_LEN: usize = FRAGMENT_PAYLOAD_START + FRAGMENT_STEPS;

/// Device firmware version reported in the handshake reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion(pub [u8; 4]);

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

/// The identity reply did not come from a MicroBrute.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unexpected device identity reply")]
pub struct BadHandshake;

/// Reply byte that is checked against the request it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyField {
    Counter,
    Opcode,
    Parameter,
    SequenceId,
    Offset,
    Length,
}

impl fmt::Display for ReplyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplyField::Counter => "sequence number",
            ReplyField::Opcode => "client",
            ReplyField::Parameter => "parameter",
            ReplyField::SequenceId => "sequence id",
            ReplyField::Offset => "offset",
            ReplyField::Length => "length",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: ReplyField,
    pub expected: u8,
    pub actual: u8,
}

/// A value extracted from a reply together with every field that did not
/// match the request. Callers decide whether a mismatch matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T> {
    pub value: T,
    pub mismatches: Vec<FieldMismatch>,
}

impl<T> Validated<T> {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

// ==================== Requests ====================

/// Universal device inquiry. Does not use the counter.
pub fn handshake_request() -> OutgoingMessage {
    OutgoingMessage::sysex(&HANDSHAKE_REQUEST)
}

pub fn get_parameter_request(counter: SequenceCounter, parameter: Parameter) -> OutgoingMessage {
    vendor_request(counter, &[OP_GET_PARAMETER, parameter.sysex_id() + 1])
}

/// `value` must already be within the parameter's domain.
pub fn set_parameter_request(
    counter: SequenceCounter,
    parameter: Parameter,
    value: u8,
) -> OutgoingMessage {
    vendor_request(counter, &[OP_SET_PARAMETER, parameter.sysex_id(), value])
}

pub fn get_sequence_fragment_request(
    counter: SequenceCounter,
    seq_id: u8,
    offset: u8,
) -> OutgoingMessage {
    let [op, sub] = OP_GET_SEQUENCE;
    vendor_request(counter, &[op, sub, seq_id, offset, FRAGMENT_LENGTH])
}

/// The step region is always 32 bytes: `steps` followed by zero padding.
/// Steps beyond 32 are not encoded.
pub fn set_sequence_fragment_request(
    counter: SequenceCounter,
    seq_id: u8,
    offset: u8,
    steps: &[Step],
) -> OutgoingMessage {
    let steps = &steps[..steps.len().min(FRAGMENT_STEPS)];
    let [op, sub] = OP_SET_SEQUENCE;
    let header = [op, sub, seq_id, offset, steps.len() as u8];
    let region = steps
        .iter()
        .map(|s| s.to_wire())
        .chain(std::iter::repeat(0))
        .take(FRAGMENT_STEPS);
    let body: Vec<u8> = header.into_iter().chain(region).collect();
    vendor_request(counter, &body)
}

/// CC messages for a non-persistent write on `channel`.
///
/// Bend range becomes the four-message RPN 0 (pitch-bend sensitivity)
/// sequence; every other parameter is one CC from the mapping table.
pub fn transient_parameter_messages(
    channel: u8,
    parameter: Parameter,
    value: u8,
) -> Result<Vec<OutgoingMessage>, Error> {
    let Some(mapping) = parameter.cc_mapping() else {
        return Ok(vec![
            OutgoingMessage::control_change(channel, RPN_MSB, 0),
            OutgoingMessage::control_change(channel, RPN_LSB, 0),
            OutgoingMessage::control_change(channel, DATA_ENTRY_MSB, value),
            OutgoingMessage::control_change(channel, DATA_ENTRY_LSB, 0),
        ]);
    };
    let mapped = mapping
        .transform
        .apply(value)
        .ok_or(Error::Mapping { parameter, value })?;
    Ok(vec![OutgoingMessage::control_change(
        channel,
        mapping.control,
        mapped,
    )])
}

fn vendor_request(counter: SequenceCounter, body: &[u8]) -> OutgoingMessage {
    let payload: Vec<u8> = VENDOR_PREFIX
        .iter()
        .copied()
        .chain(std::iter::once(counter.value()))
        .chain(body.iter().copied())
        .collect();
    OutgoingMessage::sysex(&payload)
}

// ==================== Replies ====================

pub fn parse_handshake_reply(reply: &[u8]) -> Result<FirmwareVersion, BadHandshake> {
    if !reply.starts_with(&HANDSHAKE_REPLY_PREFIX) {
        return Err(BadHandshake);
    }
    reply
        .get(VERSION_RANGE)
        .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
        .map(FirmwareVersion)
        .ok_or(BadHandshake)
}

pub fn parse_parameter_reply(
    reply: &[u8],
    counter: SequenceCounter,
    parameter: Parameter,
) -> Result<Validated<u8>, ConnectorError> {
    let mut check = ReplyCheck::new(reply, PARAMETER_REPLY_LEN)?;
    check.expect(COUNTER_INDEX, ReplyField::Counter, counter.value());
    check.expect(6, ReplyField::Opcode, OP_SET_PARAMETER);
    check.expect(7, ReplyField::Parameter, parameter.sysex_id());
    Ok(check.finish(reply[8]))
}

/// Extracts the 32 step bytes of a sequence fragment reply.
pub fn parse_sequence_fragment_reply(
    reply: &[u8],
    counter: SequenceCounter,
    seq_id: u8,
    offset: u8,
) -> Result<Validated<[u8; FRAGMENT_STEPS]>, ConnectorError> {
    let mut check = ReplyCheck::new(reply, FRAGMENT_REPLY_LEN)?;
    let [op, sub] = OP_SET_SEQUENCE;
    check.expect(COUNTER_INDEX, ReplyField::Counter, counter.value());
    check.expect(6, ReplyField::Opcode, op);
    check.expect(7, ReplyField::Opcode, sub);
    check.expect(8, ReplyField::SequenceId, seq_id);
    check.expect(9, ReplyField::Offset, offset);
    check.expect(10, ReplyField::Length, FRAGMENT_LENGTH);

    let mut steps = [0u8; FRAGMENT_STEPS];
    steps.copy_from_slice(&reply[FRAGMENT_PAYLOAD_START..FRAGMENT_REPLY_LEN]);
    Ok(check.finish(steps))
}

struct ReplyCheck<'a> {
    reply: &'a [u8],
    mismatches: Vec<FieldMismatch>,
}

impl<'a> ReplyCheck<'a> {
    fn new(reply: &'a [u8], min_len: usize) -> Result<Self, ConnectorError> {
        if reply.len() < min_len {
            return Err(ConnectorError::TruncatedReply {
                expected: min_len,
                actual: reply.len(),
            });
        }
        Ok(Self {
            reply,
            mismatches: Vec::new(),
        })
    }

    fn expect(&mut self, index: usize, field: ReplyField, expected: u8) {
        let actual = self.reply[index];
        if actual != expected {
            warn!(
                "Bad {} byte: expected {:#x}, got {:#x}",
                field, expected, actual
            );
            self.mismatches.push(FieldMismatch {
                field,
                expected,
                actual,
            });
        }
    }

    fn finish<T>(self, value: T) -> Validated<T> {
        Validated {
            value,
            mismatches: self.mismatches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(message: &OutgoingMessage) -> Vec<u8> {
        message.sysex_payload().unwrap().to_vec()
    }

    fn parameter_reply(counter: u8, id: u8, value: u8) -> Vec<u8> {
        vec![0x00, 0x20, 0x6B, 0x05, 0x01, counter, 0x01, id, value]
    }

    #[test]
    fn test_handshake_request() {
        assert_eq!(payload(&handshake_request()), vec![0x7E, 0x7F, 0x06, 0x01]);
        assert_eq!(handshake_request(), handshake_request());
    }

    #[test]
    fn test_get_parameter_request() {
        let msg = get_parameter_request(SequenceCounter::default(), Parameter::RxChannel);
        assert_eq!(
            payload(&msg),
            vec![0x00, 0x20, 0x6B, 0x05, 0x01, 0x00, 0x00, 0x06]
        );
    }

    #[test]
    fn test_get_parameter_request_is_pure() {
        let counter = SequenceCounter::new(0x33);
        assert_eq!(
            get_parameter_request(counter, Parameter::Sync),
            get_parameter_request(counter, Parameter::Sync)
        );
    }

    #[test]
    fn test_set_parameter_request() {
        let msg = set_parameter_request(SequenceCounter::new(1), Parameter::NotePriority, 0);
        assert_eq!(
            payload(&msg),
            vec![0x00, 0x20, 0x6B, 0x05, 0x01, 0x01, 0x01, 0x0B, 0x00]
        );
    }

    #[test]
    fn test_get_sequence_fragment_request() {
        let msg = get_sequence_fragment_request(SequenceCounter::new(0x2B), 4, 0x20);
        assert_eq!(
            payload(&msg),
            vec![0x00, 0x20, 0x6B, 0x05, 0x01, 0x2B, 0x03, 0x3B, 0x04, 0x20, 0x20]
        );
    }

    #[test]
    fn test_set_sequence_fragment_request() {
        let steps = [
            Step::Note(48),
            Step::Note(48),
            Step::Accent,
            Step::Note(48),
            Step::Note(48),
            Step::Note(48),
            Step::Note(60),
            Step::Note(48),
        ];
        let msg = set_sequence_fragment_request(SequenceCounter::new(7), 4, 0, &steps);

        let mut expected = vec![
            0x00, 0x20, 0x6B, 0x05, 0x01, 0x07, 0x23, 0x3A, 0x04, 0x00, 0x08, 0x30, 0x30, 0x7F,
            0x30, 0x30, 0x30, 0x3C, 0x30,
        ];
        expected.extend([0u8; 24]);
        assert_eq!(payload(&msg), expected);
    }

    #[test]
    fn test_set_sequence_fragment_request_truncates_to_32_steps() {
        let steps = [Step::Note(1); 40];
        let msg = set_sequence_fragment_request(SequenceCounter::default(), 0, 0, &steps);
        let bytes = payload(&msg);
        assert_eq!(bytes[10], 0x20);
        assert_eq!(bytes.len(), 11 + 32);
    }

    #[test]
    fn test_parse_handshake_reply() {
        let mut reply = HANDSHAKE_REPLY_PREFIX.to_vec();
        reply.extend([1, 2, 3, 4]);
        let version = parse_handshake_reply(&reply).unwrap();
        assert_eq!(version, FirmwareVersion([1, 2, 3, 4]));
        assert_eq!(version.to_string(), "1.2.3.4");
    }

    #[test]
    fn test_parse_handshake_reply_mismatch() {
        let mut reply = HANDSHAKE_REPLY_PREFIX.to_vec();
        reply[7] = 0x05;
        reply.extend([1, 0, 0, 0]);
        assert_eq!(parse_handshake_reply(&reply), Err(BadHandshake));
        assert_eq!(parse_handshake_reply(&[]), Err(BadHandshake));
    }

    #[test]
    fn test_parse_handshake_reply_without_version() {
        assert_eq!(
            parse_handshake_reply(&HANDSHAKE_REPLY_PREFIX),
            Err(BadHandshake)
        );
    }

    #[test]
    fn test_parse_parameter_reply() {
        let counter = SequenceCounter::new(3);
        let reply = parameter_reply(3, Parameter::BendRange.sysex_id(), 12);
        let parsed = parse_parameter_reply(&reply, counter, Parameter::BendRange).unwrap();
        assert_eq!(parsed.value, 12);
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_parse_parameter_reply_reports_mismatches() {
        let reply = vec![0x00, 0x20, 0x6B, 0x05, 0x01, 9, 0x02, 0x07, 5];
        let parsed =
            parse_parameter_reply(&reply, SequenceCounter::new(3), Parameter::RxChannel).unwrap();
        assert_eq!(parsed.value, 5);
        assert_eq!(
            parsed.mismatches,
            vec![
                FieldMismatch {
                    field: ReplyField::Counter,
                    expected: 3,
                    actual: 9
                },
                FieldMismatch {
                    field: ReplyField::Opcode,
                    expected: 0x01,
                    actual: 0x02
                },
                FieldMismatch {
                    field: ReplyField::Parameter,
                    expected: 0x05,
                    actual: 0x07
                },
            ]
        );
    }

    #[test]
    fn test_parse_parameter_reply_truncated() {
        let result = parse_parameter_reply(&[0x00, 0x20], SequenceCounter::default(), Parameter::Sync);
        assert!(matches!(
            result,
            Err(ConnectorError::TruncatedReply {
                expected: 9,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_parse_sequence_fragment_reply() {
        let mut reply = vec![0x00, 0x20, 0x6B, 0x05, 0x01, 0x10, 0x23, 0x3A, 0x02, 0x20, 0x20];
        reply.extend(1..=32u8);
        let parsed =
            parse_sequence_fragment_reply(&reply, SequenceCounter::new(0x10), 2, 0x20).unwrap();
        assert!(parsed.is_clean());
        assert_eq!(parsed.value[0], 1);
        assert_eq!(parsed.value[31], 32);
    }

    #[test]
    fn test_parse_sequence_fragment_reply_short_length_byte_is_lenient() {
        let mut reply = vec![0x00, 0x20, 0x6B, 0x05, 0x01, 0x00, 0x23, 0x3A, 0x01, 0x20, 0x10];
        reply.extend([0u8; 32]);
        let parsed =
            parse_sequence_fragment_reply(&reply, SequenceCounter::default(), 1, 0x20).unwrap();
        assert_eq!(parsed.mismatches.len(), 1);
        assert_eq!(parsed.mismatches[0].field, ReplyField::Length);
    }

    #[test]
    fn test_transient_bend_range_uses_rpn() {
        let msgs = transient_parameter_messages(2, Parameter::BendRange, 7).unwrap();
        let bytes: Vec<&[u8]> = msgs.iter().map(|m| m.bytes()).collect();
        assert_eq!(
            bytes,
            vec![
                &[0xB2, 101, 0][..],
                &[0xB2, 100, 0][..],
                &[0xB2, 6, 7][..],
                &[0xB2, 38, 0][..],
            ]
        );
    }

    #[test]
    fn test_transient_mapped_parameters() {
        let msgs = transient_parameter_messages(0, Parameter::TxChannel, 3).unwrap();
        assert_eq!(msgs[0].bytes(), &[0xB0, 103, 4]);

        let msgs = transient_parameter_messages(15, Parameter::StepLength, 16).unwrap();
        assert_eq!(msgs[0].bytes(), &[0xBF, 107, 60]);

        let msgs = transient_parameter_messages(0, Parameter::NextSequence, 2).unwrap();
        assert_eq!(msgs[0].bytes(), &[0xB0, 106, 87]);
    }

    #[test]
    fn test_transient_unmapped_value() {
        let result = transient_parameter_messages(0, Parameter::StepLength, 5);
        assert!(matches!(
            result,
            Err(Error::Mapping {
                parameter: Parameter::StepLength,
                value: 5
            })
        ));
    }
}
