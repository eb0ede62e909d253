//! Deposit transfer script.

use shared_types::{ContractParam, ScriptBuilder, ScriptHash};

/// Call flags granting everything; transfers notify and call `onNEP17Payment`.
const CALL_FLAGS_ALL: u8 = 0x0F;

/// `GAS.transfer(from, Notary, amount, [beneficiary, till])`.
pub fn build_deposit_script(
    from: &ScriptHash,
    beneficiary: &ScriptHash,
    amount: i64,
    till: u32,
) -> Vec<u8> {
    ScriptBuilder::new()
        .contract_call(
            &ScriptHash::GAS,
            "transfer",
            CALL_FLAGS_ALL,
            &[
                ContractParam::Hash160(*from),
                ContractParam::Hash160(ScriptHash::NOTARY),
                ContractParam::Integer(amount),
                ContractParam::Array(vec![
                    ContractParam::Hash160(*beneficiary),
                    ContractParam::Integer(i64::from(till)),
                ]),
            ],
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Opcode;

    #[test]
    fn test_script_targets_gas_transfer() {
        let from = ScriptHash::new([1; 20]);
        let beneficiary = ScriptHash::new([2; 20]);
        let script = build_deposit_script(&from, &beneficiary, 100_000_000, u32::MAX);

        let gas = ScriptHash::GAS;
        let tail = &script[script.len() - 27..];
        assert_eq!(tail[0], Opcode::PushData1 as u8);
        assert_eq!(&tail[2..22], gas.as_bytes());
        assert_eq!(tail[22], Opcode::Syscall as u8);

        let needle = beneficiary.as_bytes();
        assert!(script.windows(20).any(|w| w == needle));
        assert!(script.windows(8).any(|w| w == b"transfer"));
    }

    #[test]
    fn test_till_is_encoded_unsigned() {
        let script = build_deposit_script(
            &ScriptHash::default(),
            &ScriptHash::default(),
            1,
            u32::MAX,
        );
        // u32::MAX needs a 5th byte to stay positive, so it widens to PUSHINT64.
        let mut wide = vec![Opcode::PushInt64 as u8];
        wide.extend_from_slice(&i64::from(u32::MAX).to_le_bytes());
        assert!(script.windows(9).any(|w| w == wide.as_slice()));
    }
}
