//! # Call Trailer
//!
//! The last four instructions of a contract-call script, in stream order:
//!
//! ```text
//! <flags: PUSH0..PUSH16> <method: PUSHDATA> <contract: PUSHDATA 20> SYSCALL System.Contract.Call
//! ```
//!
//! Checked from the end: syscall, contract, method, flags.

use crate::domain::{AuthenticatorConfig, CallFlags, Instruction, RejectionReason};
use shared_types::vm::SYSTEM_CONTRACT_CALL;
use shared_types::{interop_id, Opcode, ScriptHash};

/// Instructions in a call trailer.
pub const TRAILER_LEN: usize = 4;

/// The accepted trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTrailer {
    /// Called contract.
    pub contract: ScriptHash,
    /// Called method.
    pub method: String,
    /// Flags granted to the callee.
    pub call_flags: CallFlags,
}

/// Split `instructions` into argument prologue and an accepted trailer.
pub fn parse_trailer<'a>(
    instructions: &'a [Instruction],
    config: &AuthenticatorConfig,
) -> Result<(CallTrailer, &'a [Instruction]), RejectionReason> {
    let Some(split) = instructions.len().checked_sub(TRAILER_LEN) else {
        return Err(RejectionReason::NotACall);
    };
    let (prologue, trailer) = instructions.split_at(split);
    let [flags, method, contract, syscall] = trailer else {
        return Err(RejectionReason::NotACall);
    };

    if syscall.opcode != Opcode::Syscall
        || syscall.operand.as_slice() != interop_id(SYSTEM_CONTRACT_CALL)
    {
        return Err(RejectionReason::NotACall);
    }

    let contract_bytes = contract.push_data().ok_or(RejectionReason::NotACall)?;
    let contract = ScriptHash::from_slice(contract_bytes).map_err(|_| {
        RejectionReason::WrongContract {
            got: hex::encode(contract_bytes),
        }
    })?;
    if contract != config.contract {
        return Err(RejectionReason::WrongContract {
            got: contract.to_string(),
        });
    }

    let method_bytes = method.push_data().ok_or(RejectionReason::NotACall)?;
    let method = String::from_utf8_lossy(method_bytes).into_owned();
    if method != config.method {
        return Err(RejectionReason::WrongMethod { got: method });
    }

    let value = flags.opcode.small_int();
    let call_flags = value
        .filter(|_| flags.opcode != Opcode::PushM1)
        .and_then(CallFlags::from_value)
        .ok_or(RejectionReason::BadCallFlag { value })?;

    Ok((
        CallTrailer {
            contract,
            method,
            call_flags,
        },
        prologue,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::decode_script;
    use shared_types::ScriptBuilder;

    fn trailer_script(flags: i64, method: &str, contract: &[u8]) -> Vec<u8> {
        ScriptBuilder::new()
            .push_int(flags)
            .push_bytes(method.as_bytes())
            .push_bytes(contract)
            .emit_with(Opcode::Syscall, &interop_id(SYSTEM_CONTRACT_CALL))
            .build()
    }

    fn parse(script: &[u8]) -> Result<CallTrailer, RejectionReason> {
        let stream = decode_script(script).unwrap();
        parse_trailer(stream.as_slice(), &AuthenticatorConfig::default()).map(|(t, _)| t)
    }

    #[test]
    fn test_accepts_expected_call() {
        let contract = AuthenticatorConfig::DEFAULT_CONTRACT;
        let trailer = parse(&trailer_script(15, "mint", contract.as_bytes())).unwrap();
        assert_eq!(trailer.contract, contract);
        assert_eq!(trailer.method, "mint");
        assert_eq!(trailer.call_flags, CallFlags::ALL);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(parse(&[Opcode::Push1 as u8]), Err(RejectionReason::NotACall));
    }

    #[test]
    fn test_other_syscall() {
        let contract = AuthenticatorConfig::DEFAULT_CONTRACT;
        let mut script = trailer_script(15, "mint", contract.as_bytes());
        let len = script.len();
        script[len - 1] ^= 0xFF;
        assert_eq!(parse(&script), Err(RejectionReason::NotACall));
    }

    #[test]
    fn test_wrong_contract_length() {
        let err = parse(&trailer_script(15, "mint", &[1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            RejectionReason::WrongContract {
                got: "010203".into()
            }
        );
    }

    #[test]
    fn test_bad_flags() {
        let contract = AuthenticatorConfig::DEFAULT_CONTRACT;
        assert_eq!(
            parse(&trailer_script(16, "mint", contract.as_bytes())),
            Err(RejectionReason::BadCallFlag { value: Some(16) })
        );
        assert_eq!(
            parse(&trailer_script(-1, "mint", contract.as_bytes())),
            Err(RejectionReason::BadCallFlag { value: Some(-1) })
        );
        assert_eq!(
            parse(&trailer_script(100, "mint", contract.as_bytes())),
            Err(RejectionReason::BadCallFlag { value: None })
        );
    }
}
