//! # Domain Entities
//!
//! - `InstructionStream`: decoded script, immutable once built
//! - `Argument`: one reconstructed call argument (possibly nested)
//! - `ValidatedCallIntent`: the accepted call
//! - `MintIntent`: typed view of a mint call

use super::errors::{ArgumentError, RejectionReason};
use super::value_objects::{CallFlags, IntegerLiteral, MIN_ITEM_NAME_LEN};
use serde::{Deserialize, Serialize};
use shared_types::{Opcode, ScriptHash};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset of the opcode in the script.
    pub offset: usize,
    /// The opcode.
    pub opcode: Opcode,
    /// Operand bytes; for length-prefixed pushes this is the data only.
    pub operand: Vec<u8>,
}

impl Instruction {
    /// Pushed bytes for `PUSHDATA*`.
    #[must_use]
    pub fn push_data(&self) -> Option<&[u8]> {
        match self.opcode {
            Opcode::PushData1 | Opcode::PushData2 | Opcode::PushData4 => Some(&self.operand),
            _ => None,
        }
    }

    /// Integer pushed by `PUSHM1`, `PUSH0..PUSH16` or `PUSHINT*`.
    #[must_use]
    pub fn integer(&self) -> Option<IntegerLiteral> {
        if let Some(small) = self.opcode.small_int() {
            return Some(IntegerLiteral::from_i64(small));
        }
        self.opcode
            .is_push_int()
            .then(|| IntegerLiteral::from_le_bytes(&self.operand))
    }
}

/// A script decoded up to (not including) its return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
}

impl InstructionStream {
    pub(crate) fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True when the script returned immediately.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions in stream order.
    #[must_use]
    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterate in stream order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

/// A reconstructed call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// Byte string (`PUSHDATA*`).
    Bytes(Vec<u8>),
    /// Integer literal.
    Integer(IntegerLiteral),
    /// Boolean (`PUSHT`/`PUSHF`, optionally converted).
    Bool(bool),
    /// `PUSHNULL`.
    Null,
    /// Nested array, elements in declaration order.
    Array(Vec<Argument>),
}

impl Argument {
    /// Bytes, if this is a byte string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Argument::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// A script accepted by the authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedCallIntent {
    /// Called contract.
    pub contract: ScriptHash,
    /// Called method.
    pub method: String,
    /// Permissions granted to the callee.
    pub call_flags: CallFlags,
    /// Arguments in declaration order.
    pub args: Vec<Argument>,
}

/// A validated `mint(recipient, name)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintIntent {
    /// Account receiving the item.
    pub recipient: ScriptHash,
    /// Item name; also names the external resource.
    pub item_name: String,
}

impl TryFrom<&ValidatedCallIntent> for MintIntent {
    type Error = RejectionReason;

    fn try_from(intent: &ValidatedCallIntent) -> Result<Self, Self::Error> {
        let [recipient, name] = intent.args.as_slice() else {
            return Err(ArgumentError::WrongArity {
                expected: 2,
                got: intent.args.len(),
            }
            .into());
        };

        let recipient = recipient
            .as_bytes()
            .and_then(|b| ScriptHash::from_slice(b).ok())
            .ok_or(ArgumentError::NotAnAccount(0))?;

        let raw = name
            .as_bytes()
            .ok_or_else(|| ArgumentError::InvalidItemName("not a byte string".into()))?;
        let item_name = String::from_utf8(raw.to_vec())
            .map_err(|_| ArgumentError::InvalidItemName("not UTF-8".into()))?;
        if item_name.chars().count() < MIN_ITEM_NAME_LEN {
            return Err(ArgumentError::InvalidItemName(format!(
                "`{item_name}` shorter than {MIN_ITEM_NAME_LEN}"
            ))
            .into());
        }

        Ok(Self {
            recipient,
            item_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(args: Vec<Argument>) -> ValidatedCallIntent {
        ValidatedCallIntent {
            contract: ScriptHash::default(),
            method: "mint".into(),
            call_flags: CallFlags::ALL,
            args,
        }
    }

    #[test]
    fn test_mint_intent_from_args() {
        let owner = ScriptHash::new([7u8; 20]);
        let mint = MintIntent::try_from(&intent(vec![
            Argument::Bytes(owner.as_bytes().to_vec()),
            Argument::Bytes(b"nyancoin.gif".to_vec()),
        ]))
        .unwrap();
        assert_eq!(mint.recipient, owner);
        assert_eq!(mint.item_name, "nyancoin.gif");
    }

    #[test]
    fn test_mint_intent_arity() {
        let err = MintIntent::try_from(&intent(vec![Argument::Null])).unwrap_err();
        assert_eq!(
            err,
            RejectionReason::BadArgumentEncoding(ArgumentError::WrongArity {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_mint_intent_short_name() {
        let err = MintIntent::try_from(&intent(vec![
            Argument::Bytes(vec![1u8; 20]),
            Argument::Bytes(b"ab".to_vec()),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            RejectionReason::BadArgumentEncoding(ArgumentError::InvalidItemName(_))
        ));
    }

    #[test]
    fn test_mint_intent_recipient_must_be_account() {
        let err = MintIntent::try_from(&intent(vec![
            Argument::Bytes(vec![1u8; 19]),
            Argument::Bytes(b"abc".to_vec()),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            RejectionReason::BadArgumentEncoding(ArgumentError::NotAnAccount(0))
        );
    }

    #[test]
    fn test_instruction_integer() {
        let push = Instruction {
            offset: 0,
            opcode: Opcode::PushInt16,
            operand: vec![0x00, 0x01],
        };
        assert_eq!(push.integer().and_then(|i| i.to_i64()), Some(256));

        let data = Instruction {
            offset: 0,
            opcode: Opcode::PushData1,
            operand: vec![1],
        };
        assert!(data.integer().is_none());
        assert_eq!(data.push_data(), Some(&[1u8][..]));
    }
}
