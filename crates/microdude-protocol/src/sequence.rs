//! Step sequences and their one-line text form.
//!
//! A line looks like `2:40 52 x 64`: the 1-based sequence id, a colon, then
//! space-separated step tokens. Each token is a wire value 0-127 or `x`.
//! Trailing rests are never written; a short line implies rests up to 64 steps.
//! A `0` inside a line is a rest too, so the device stops playing there.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SEQUENCE_COUNT: u8 = 8;
pub const SEQUENCE_STEPS: usize = 64;
pub const FRAGMENT_STEPS: usize = 32;

const ACCENT_TOKEN: &str = "x";
const ACCENT_BYTE: u8 = 0x7F;

/// One step as stored by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Gate off. Also marks the end of the sequence when rendered.
    #[default]
    Rest,
    Note(u8),
    /// Special step, `x` in text and 0x7F on the wire.
    Accent,
}

impl Step {
    pub fn from_wire(byte: u8) -> Self {
        match byte & 0x7F {
            0 => Step::Rest,
            ACCENT_BYTE => Step::Accent,
            note => Step::Note(note),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Step::Rest => 0,
            Step::Note(note) => note & 0x7F,
            Step::Accent => ACCENT_BYTE,
        }
    }

    fn parse_token(token: &str) -> Result<Self, SequenceTextError> {
        if token == ACCENT_TOKEN {
            return Ok(Step::Accent);
        }
        match token.parse::<u8>() {
            Ok(value @ 0..=0x7F) => Ok(Step::from_wire(value)),
            _ => Err(SequenceTextError::InvalidStep(token.to_string())),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Accent => f.write_str(ACCENT_TOKEN),
            step => write!(f, "{}", step.to_wire()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceTextError {
    #[error("missing ':' separator")]
    MissingSeparator,

    #[error("empty sequence id")]
    EmptyId,

    #[error("empty step list")]
    EmptySteps,

    #[error("invalid sequence id '{0}' (expected 1-8)")]
    InvalidId(char),

    #[error("invalid step '{0}' (expected 0-127 or 'x')")]
    InvalidStep(String),

    #[error("{0} steps exceed the 64-step limit")]
    TooManySteps(usize),
}

/// A full 64-step sequence as read from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    id: u8,
    steps: [Step; SEQUENCE_STEPS],
}

impl Sequence {
    /// `id` is 0-based.
    pub fn new(id: u8, steps: [Step; SEQUENCE_STEPS]) -> Self {
        Self { id, steps }
    }

    /// Build from raw wire bytes; missing trailing steps are rests.
    pub fn from_wire(id: u8, bytes: &[u8]) -> Self {
        let mut steps = [Step::Rest; SEQUENCE_STEPS];
        for (step, byte) in steps.iter_mut().zip(bytes) {
            *step = Step::from_wire(*byte);
        }
        Self { id, steps }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn steps(&self) -> &[Step; SEQUENCE_STEPS] {
        &self.steps
    }

    /// Steps up to, not including, the first rest.
    pub fn played_steps(&self) -> &[Step] {
        let end = self
            .steps
            .iter()
            .position(|s| *s == Step::Rest)
            .unwrap_or(SEQUENCE_STEPS);
        &self.steps[..end]
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line(f, self.id, self.played_steps())
    }
}

/// A parsed sequence line, ready to be split into wire fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceText {
    id: u8,
    steps: Vec<Step>,
}

impl SequenceText {
    /// Parse one line. Trailing line terminators are ignored.
    ///
    /// Only the first character of the id segment is read: ids are a single
    /// digit 1-8.
    pub fn parse(line: &str) -> Result<Self, SequenceTextError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (id_part, steps_part) = line
            .split_once(':')
            .ok_or(SequenceTextError::MissingSeparator)?;

        let id_char = id_part.chars().next().ok_or(SequenceTextError::EmptyId)?;
        let id = match id_char.to_digit(10) {
            Some(digit @ 1..=8) => digit as u8 - 1,
            _ => return Err(SequenceTextError::InvalidId(id_char)),
        };

        let steps = steps_part
            .split_whitespace()
            .map(Step::parse_token)
            .collect::<Result<Vec<_>, _>>()?;
        if steps.is_empty() {
            return Err(SequenceTextError::EmptySteps);
        }
        if steps.len() > SEQUENCE_STEPS {
            return Err(SequenceTextError::TooManySteps(steps.len()));
        }

        Ok(Self { id, steps })
    }

    /// 0-based id.
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// `(offset, steps)` pairs: always the first fragment, the second only
    /// when more than 32 steps are present.
    pub fn fragments(&self) -> impl Iterator<Item = (u8, &[Step])> {
        self.steps
            .chunks(FRAGMENT_STEPS)
            .enumerate()
            .map(|(i, chunk)| ((i * FRAGMENT_STEPS) as u8, chunk))
    }

    pub fn into_sequence(self) -> Sequence {
        let mut steps = [Step::Rest; SEQUENCE_STEPS];
        steps[..self.steps.len()].copy_from_slice(&self.steps);
        Sequence::new(self.id, steps)
    }
}

impl FromStr for SequenceText {
    type Err = SequenceTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SequenceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line(f, self.id, &self.steps)
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, id: u8, steps: &[Step]) -> fmt::Result {
    write!(f, "{}:", u32::from(id) + 1)?;
    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", step)?;
    }
    Ok(())
}
