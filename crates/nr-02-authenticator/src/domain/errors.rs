//! # Domain Errors
//!
//! Why a script or request was refused.

use shared_types::Opcode;
use thiserror::Error;

/// Script bytes that do not form an instruction stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte does not name any opcode.
    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode {
        /// Position of the byte
        offset: usize,
        /// The byte itself
        byte: u8,
    },

    /// Operand runs past the end of the script.
    #[error("truncated operand for {opcode:?} at offset {offset}")]
    TruncatedOperand {
        /// Position of the opcode
        offset: usize,
        /// The opcode whose operand is short
        opcode: Opcode,
    },

    /// Bytes follow an explicit return.
    #[error("{count} trailing bytes after RET at offset {offset}")]
    TrailingBytes {
        /// Position of the RET
        offset: usize,
        /// Number of bytes after it
        count: usize,
    },
}

/// Argument prologue that does not follow the packing grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// Nothing precedes the call trailer.
    #[error("no argument array before the call")]
    MissingArgumentArray,

    /// Array did not end with `PACK`.
    #[error("expected PACK, found {0:?}")]
    ExpectedPack(Opcode),

    /// Element count was not a usable integer literal.
    #[error("invalid element count")]
    InvalidCount,

    /// Fewer instructions than the declared count.
    #[error("declared {declared} elements, found {found}")]
    CountMismatch {
        /// Count carried by the array literal
        declared: usize,
        /// Elements actually present
        found: usize,
    },

    /// Instructions left over after the outermost array.
    #[error("{0} unconsumed instructions before the argument array")]
    Unconsumed(usize),

    /// Arrays nested deeper than the decoder follows.
    #[error("arrays nested deeper than {0}")]
    TooDeep(usize),

    /// Opcode that cannot appear in an argument.
    #[error("unexpected opcode {0:?} in arguments")]
    UnexpectedOpcode(Opcode),

    /// `CONVERT` not applied to a boolean literal, or to a non-boolean type.
    #[error("CONVERT must coerce PUSHT/PUSHF to Boolean")]
    UnexpectedConvert,

    /// Wrong number of arguments for the method.
    #[error("expected {expected} arguments, got {got}")]
    WrongArity {
        /// Arguments the method takes
        expected: usize,
        /// Arguments supplied
        got: usize,
    },

    /// Argument is not a 20-byte account identifier.
    #[error("argument {0} is not an account")]
    NotAnAccount(usize),

    /// Item name is not valid UTF-8 or too short.
    #[error("invalid item name: {0}")]
    InvalidItemName(String),
}

/// Reasons a request is refused by the authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// Request did not carry exactly the expected signers.
    #[error("wrong signer count: expected 3, got {got}")]
    WrongSignerCount {
        /// Signers present
        got: usize,
    },

    /// Script could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Script does not end in a contract call.
    #[error("not a contract call")]
    NotACall,

    /// Call targets a different contract.
    #[error("unexpected contract: {got}")]
    WrongContract {
        /// Target found in the script
        got: String,
    },

    /// Call targets a different method.
    #[error("unexpected method: {got}")]
    WrongMethod {
        /// Method found in the script
        got: String,
    },

    /// Call flag missing or out of range.
    #[error("bad call flag: {value:?}")]
    BadCallFlag {
        /// Decoded value, if the instruction was a small integer at all
        value: Option<i64>,
    },

    /// Arguments do not follow the packing grammar.
    #[error("bad argument encoding: {0}")]
    BadArgumentEncoding(#[from] ArgumentError),
}
