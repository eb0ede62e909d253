//! # Instruction Decoder
//!
//! Single-step decoding driven only by the opcode table: every opcode implies
//! its operand layout, so no instruction is ever executed.

use crate::domain::{DecodeError, Instruction, InstructionStream};
use shared_types::{Opcode, Operand};

/// Decode `script` up to its return.
///
/// Running off the end of the script is an implicit return, as on the
/// ledger VM. Bytes after an explicit `RET` are rejected.
pub fn decode_script(script: &[u8]) -> Result<InstructionStream, DecodeError> {
    let mut instructions = Vec::new();
    let mut ip = 0usize;

    while ip < script.len() {
        let offset = ip;
        let byte = script[ip];
        let opcode = Opcode::from_byte(byte).ok_or(DecodeError::UnknownOpcode { offset, byte })?;
        ip += 1;

        let truncated = DecodeError::TruncatedOperand { offset, opcode };
        let operand = match opcode.operand() {
            Operand::None => Vec::new(),
            Operand::Fixed(size) => take(script, &mut ip, size).ok_or(truncated)?.to_vec(),
            Operand::Prefixed(width) => {
                let prefix = take(script, &mut ip, width).ok_or(truncated.clone())?;
                let mut len = [0u8; 4];
                len[..width].copy_from_slice(prefix);
                let len = usize::try_from(u32::from_le_bytes(len)).map_err(|_| truncated.clone())?;
                take(script, &mut ip, len).ok_or(truncated)?.to_vec()
            }
        };

        if opcode == Opcode::Ret {
            if ip < script.len() {
                return Err(DecodeError::TrailingBytes {
                    offset,
                    count: script.len() - ip,
                });
            }
            break;
        }

        instructions.push(Instruction {
            offset,
            opcode,
            operand,
        });
    }

    Ok(InstructionStream::new(instructions))
}

fn take<'a>(script: &'a [u8], ip: &mut usize, n: usize) -> Option<&'a [u8]> {
    let end = ip.checked_add(n)?;
    let slice = script.get(*ip..end)?;
    *ip = end;
    Some(slice)
}
