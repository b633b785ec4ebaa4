//! Rolling 7-bit transaction counter echoed back by the device.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Always in `0..=127`; wraps to 0 after 127.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceCounter(u8);

impl SequenceCounter {
    pub const MAX: u8 = 0x7F;

    /// Values above 127 are truncated to 7 bits.
    pub const fn new(value: u8) -> Self {
        Self(value & Self::MAX)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn advance(&mut self) {
        self.0 = (self.0 + 1) & Self::MAX;
    }

    #[inline]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) & Self::MAX)
    }
}

impl From<SequenceCounter> for u8 {
    fn from(counter: SequenceCounter) -> u8 {
        counter.0
    }
}

impl fmt::Display for SequenceCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
