//! # Value Objects
//!
//! Call flags and integer literals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signers every assisted request must carry: relay, counterparty, notary.
pub const REQUIRED_SIGNERS: usize = 3;

/// Shortest item name the contract accepts.
pub const MIN_ITEM_NAME_LEN: usize = 3;

/// Permissions granted to a called contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallFlags(u8);

impl CallFlags {
    /// No permissions.
    pub const NONE: CallFlags = CallFlags(0);
    /// May read contract storage.
    pub const READ_STATES: CallFlags = CallFlags(0b0001);
    /// May write contract storage.
    pub const WRITE_STATES: CallFlags = CallFlags(0b0010);
    /// May call other contracts.
    pub const ALLOW_CALL: CallFlags = CallFlags(0b0100);
    /// May emit notifications.
    pub const ALLOW_NOTIFY: CallFlags = CallFlags(0b1000);
    /// Read and write storage.
    pub const STATES: CallFlags = CallFlags(0b0011);
    /// Read storage and call.
    pub const READ_ONLY: CallFlags = CallFlags(0b0101);
    /// Everything.
    pub const ALL: CallFlags = CallFlags(0b1111);

    /// Accepts only values inside the defined flag range.
    #[must_use]
    pub fn from_value(value: i64) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::ALL.0)
            .map(CallFlags)
    }

    /// Raw bits.
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// True when every bit of `other` is set.
    #[must_use]
    pub fn contains(&self, other: CallFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for CallFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::NONE => "None",
            Self::READ_STATES => "ReadStates",
            Self::WRITE_STATES => "WriteStates",
            Self::ALLOW_CALL => "AllowCall",
            Self::ALLOW_NOTIFY => "AllowNotify",
            Self::STATES => "States",
            Self::READ_ONLY => "ReadOnly",
            Self::ALL => "All",
            other => return write!(f, "{:#06b}", other.0),
        };
        f.write_str(name)
    }
}

/// An integer of any width, as minimal little-endian two's complement.
///
/// Zero is the empty byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntegerLiteral(Vec<u8>);

impl IntegerLiteral {
    /// Normalize sign-extended little-endian bytes.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let mut out = bytes.to_vec();
        while let Some(&last) = out.last() {
            let redundant = match out.len() {
                1 => last == 0x00,
                n => {
                    let prev_negative = out[n - 2] & 0x80 != 0;
                    (last == 0x00 && !prev_negative) || (last == 0xFF && prev_negative)
                }
            };
            if !redundant {
                break;
            }
            out.pop();
        }
        Self(out)
    }

    /// From a machine integer.
    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Self::from_le_bytes(&value.to_le_bytes())
    }

    /// Minimal encoding.
    #[must_use]
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Sign bit of the most significant byte.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.last().is_some_and(|b| b & 0x80 != 0)
    }

    /// Value as `i64`, if it fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.0.len() > 8 {
            return None;
        }
        let fill = if self.is_negative() { 0xFF } else { 0x00 };
        let mut buf = [fill; 8];
        buf[..self.0.len()].copy_from_slice(&self.0);
        Some(i64::from_le_bytes(buf))
    }

    /// Value as a non-negative count, if it is one.
    #[must_use]
    pub fn to_count(&self) -> Option<usize> {
        self.to_i64().and_then(|v| usize::try_from(v).ok())
    }
}

impl fmt::Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_i64() {
            Some(v) => write!(f, "{v}"),
            None => {
                f.write_str("0x")?;
                for b in self.0.iter().rev() {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}
