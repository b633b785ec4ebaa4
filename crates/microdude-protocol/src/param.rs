//! Device parameters: SysEx ids, legal value domains and the CC mapping table
//! used by the non-persistent write path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registered Parameter Number select (MSB/LSB) and data entry controls.
pub const RPN_MSB: u8 = 101;
pub const RPN_LSB: u8 = 100;
pub const DATA_ENTRY_MSB: u8 = 6;
pub const DATA_ENTRY_LSB: u8 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    RxChannel,
    TxChannel,
    Retriggering,
    LfoKeyRetrigger,
    PlayOn,
    NotePriority,
    EnvelopeLegato,
    VelocityResponse,
    NextSequence,
    BendRange,
    StepLength,
    GateLength,
    StepOn,
    Sync,
}

impl Parameter {
    /// Every parameter, in the order an editor reads them after connecting.
    pub const ALL: [Parameter; 14] = [
        Parameter::RxChannel,
        Parameter::TxChannel,
        Parameter::Retriggering,
        Parameter::LfoKeyRetrigger,
        Parameter::PlayOn,
        Parameter::NotePriority,
        Parameter::EnvelopeLegato,
        Parameter::VelocityResponse,
        Parameter::NextSequence,
        Parameter::BendRange,
        Parameter::StepLength,
        Parameter::GateLength,
        Parameter::StepOn,
        Parameter::Sync,
    ];

    pub const fn sysex_id(self) -> u8 {
        match self {
            Parameter::RxChannel => 0x05,
            Parameter::TxChannel => 0x07,
            Parameter::NotePriority => 0x0B,
            Parameter::EnvelopeLegato => 0x0D,
            Parameter::LfoKeyRetrigger => 0x0F,
            Parameter::VelocityResponse => 0x11,
            Parameter::StepOn => 0x2A,
            Parameter::BendRange => 0x2C,
            Parameter::PlayOn => 0x2E,
            Parameter::NextSequence => 0x32,
            Parameter::Retriggering => 0x34,
            Parameter::GateLength => 0x36,
            Parameter::StepLength => 0x38,
            Parameter::Sync => 0x3C,
        }
    }

    pub fn from_sysex_id(id: u8) -> Option<Parameter> {
        Self::ALL.into_iter().find(|p| p.sysex_id() == id)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Parameter::RxChannel => "MIDI receive channel",
            Parameter::TxChannel => "MIDI transmit channel",
            Parameter::Retriggering => "sequence retriggering",
            Parameter::LfoKeyRetrigger => "LFO key retrigger",
            Parameter::PlayOn => "sequence play on",
            Parameter::NotePriority => "note priority",
            Parameter::EnvelopeLegato => "envelope legato",
            Parameter::VelocityResponse => "velocity response",
            Parameter::NextSequence => "next sequence",
            Parameter::BendRange => "bend range",
            Parameter::StepLength => "step length",
            Parameter::GateLength => "gate length",
            Parameter::StepOn => "step on",
            Parameter::Sync => "sync",
        }
    }

    /// Values the device accepts for this parameter.
    pub const fn domain(self) -> Domain {
        match self {
            // 16 selects "all channels" on receive
            Parameter::RxChannel => Domain::Range { min: 0, max: 16 },
            Parameter::TxChannel => Domain::Range { min: 0, max: 15 },
            Parameter::BendRange => Domain::Range { min: 1, max: 12 },
            Parameter::StepLength => Domain::Set(&[4, 8, 16, 32]),
            Parameter::LfoKeyRetrigger
            | Parameter::PlayOn
            | Parameter::EnvelopeLegato
            | Parameter::StepOn => Domain::Range { min: 0, max: 1 },
            Parameter::Retriggering
            | Parameter::NotePriority
            | Parameter::VelocityResponse
            | Parameter::NextSequence
            | Parameter::GateLength
            | Parameter::Sync => Domain::Range { min: 0, max: 2 },
        }
    }

    /// CC control and value transform for the transient write path.
    ///
    /// `None` for [`Parameter::BendRange`], which is written through RPN 0.
    pub const fn cc_mapping(self) -> Option<CcMapping> {
        let (control, transform) = match self {
            Parameter::RxChannel => (102, Transform::PlusOne),
            Parameter::TxChannel => (103, Transform::PlusOne),
            Parameter::Retriggering => (104, Transform::Proportional { positions: 3 }),
            Parameter::PlayOn => (105, Transform::Proportional { positions: 2 }),
            Parameter::NextSequence => (106, Transform::Special),
            Parameter::StepLength => (107, Transform::StepLength),
            Parameter::Sync => (108, Transform::Proportional { positions: 3 }),
            Parameter::EnvelopeLegato => (109, Transform::Proportional { positions: 2 }),
            Parameter::LfoKeyRetrigger => (110, Transform::Proportional { positions: 2 }),
            Parameter::NotePriority => (111, Transform::Proportional { positions: 3 }),
            Parameter::VelocityResponse => (112, Transform::Proportional { positions: 3 }),
            Parameter::GateLength => (113, Transform::Proportional { positions: 3 }),
            Parameter::StepOn => (114, Transform::Proportional { positions: 2 }),
            Parameter::BendRange => return None,
        };
        Some(CcMapping { control, transform })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Range { min: u8, max: u8 },
    Set(&'static [u8]),
}

impl Domain {
    pub fn contains(&self, value: u8) -> bool {
        match *self {
            Domain::Range { min, max } => (min..=max).contains(&value),
            Domain::Set(values) => values.contains(&value),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { min, max } => write!(f, "{}-{}", min, max),
            Domain::Set(values) => {
                let values: Vec<String> = values.iter().map(u8::to_string).collect();
                write!(f, "{{{}}}", values.join(", "))
            }
        }
    }
}

/// Entry of the CC mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcMapping {
    pub control: u8,
    pub transform: Transform,
}

/// How a stored parameter value becomes a CC value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// 0-indexed channel to 1-indexed control value.
    PlusOne,
    /// Spread `positions` choices over the 0-127 control range (`v * (128 / positions)`).
    Proportional { positions: u8 },
    /// {4, 8, 16, 32} to {0, 30, 60, 90}.
    StepLength,
    /// Tri-state {0, 1, 2} to {0, 43, 87}.
    Special,
}

impl Transform {
    /// `None` when `value` has no image under this transform.
    pub fn apply(self, value: u8) -> Option<u8> {
        let mapped = match self {
            Transform::PlusOne => value.checked_add(1)?,
            Transform::Proportional { positions } => {
                if positions == 0 || value >= positions {
                    return None;
                }
                value * (128 / positions)
            }
            Transform::StepLength => match value {
                4 => 0,
                8 => 30,
                16 => 60,
                32 => 90,
                _ => return None,
            },
            Transform::Special => match value {
                0 => 0,
                1 => 43,
                2 => 87,
                _ => return None,
            },
        };
        (mapped <= 0x7F).then_some(mapped)
    }
}
