//! # Argument Prologue
//!
//! Everything before the call trailer builds the argument array. Arrays are
//! emitted as `<elements in reverse> <count> PACK`, so reading the stream
//! right-to-left from `PACK` yields the elements in declaration order.
//!
//! Element grammar (right-to-left):
//!
//! ```text
//! element := literal                       ; PUSHINT*, PUSHM1, PUSH0..16, PUSHDATA*, PUSHT, PUSHF, PUSHNULL
//!          | (PUSHT | PUSHF) CONVERT 0x20  ; boolean
//!          | element* count PACK           ; nested array
//!          | NEWARRAY0                     ; empty nested array
//! ```

use crate::domain::{Argument, ArgumentError, Instruction};
use shared_types::vm::STACK_ITEM_BOOLEAN;
use shared_types::Opcode;

/// Deepest array nesting followed before giving up.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Reconstruct the argument list from the prologue.
pub fn parse_arguments(prologue: &[Instruction]) -> Result<Vec<Argument>, ArgumentError> {
    match prologue {
        [] => Err(ArgumentError::MissingArgumentArray),
        [only] if only.opcode == Opcode::NewArray0 => Ok(Vec::new()),
        _ => {
            let mut end = prologue.len();
            let args = parse_array(prologue, &mut end, 0)?;
            if end != 0 {
                return Err(ArgumentError::Unconsumed(end));
            }
            Ok(args)
        }
    }
}

/// `ops[..*end]` ends with `count PACK`; consumes the whole array.
fn parse_array(
    ops: &[Instruction],
    end: &mut usize,
    depth: usize,
) -> Result<Vec<Argument>, ArgumentError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ArgumentError::TooDeep(MAX_NESTING_DEPTH));
    }

    let pack = &ops[*end - 1];
    if pack.opcode != Opcode::Pack {
        return Err(ArgumentError::ExpectedPack(pack.opcode));
    }
    if *end < 2 {
        return Err(ArgumentError::InvalidCount);
    }
    let declared = ops[*end - 2]
        .integer()
        .and_then(|i| i.to_count())
        .ok_or(ArgumentError::InvalidCount)?;
    *end -= 2;

    let mut items = Vec::with_capacity(declared.min(*end));
    for found in 0..declared {
        if *end == 0 {
            return Err(ArgumentError::CountMismatch { declared, found });
        }
        items.push(parse_element(ops, end, depth)?);
    }
    Ok(items)
}

fn parse_element(
    ops: &[Instruction],
    end: &mut usize,
    depth: usize,
) -> Result<Argument, ArgumentError> {
    let ins = &ops[*end - 1];
    match ins.opcode {
        Opcode::Pack => parse_array(ops, end, depth + 1).map(Argument::Array),
        Opcode::NewArray0 => {
            *end -= 1;
            Ok(Argument::Array(Vec::new()))
        }
        Opcode::Convert => {
            if ins.operand != [STACK_ITEM_BOOLEAN] || *end < 2 {
                return Err(ArgumentError::UnexpectedConvert);
            }
            let value = match ops[*end - 2].opcode {
                Opcode::PushT => true,
                Opcode::PushF => false,
                _ => return Err(ArgumentError::UnexpectedConvert),
            };
            *end -= 2;
            Ok(Argument::Bool(value))
        }
        op => {
            let arg = literal(ins).ok_or(ArgumentError::UnexpectedOpcode(op))?;
            *end -= 1;
            Ok(arg)
        }
    }
}

fn literal(ins: &Instruction) -> Option<Argument> {
    match ins.opcode {
        Opcode::PushT => Some(Argument::Bool(true)),
        Opcode::PushF => Some(Argument::Bool(false)),
        Opcode::PushNull => Some(Argument::Null),
        _ => ins
            .push_data()
            .map(|data| Argument::Bytes(data.to_vec()))
            .or_else(|| ins.integer().map(Argument::Integer)),
    }
}
