//! # Witness Assembly
//!
//! Fills every witness slot of a transaction the relay can speak for:
//!
//! | Signer        | Witness                                           |
//! |---------------|---------------------------------------------------|
//! | relay         | fresh signature                                   |
//! | counterparty  | its own signature if already present, else a placeholder |
//! | Notary        | 64 zero bytes, replaced by the notary subsystem   |

use crate::domain::{CoSigningError, SigningAccount, WitnessOnlyAccount};
use shared_types::{Opcode, ScriptHash, Transaction, Witness};

/// Invocation placeholder the notary subsystem overwrites.
pub fn notary_placeholder() -> Witness {
    let mut invocation = Vec::with_capacity(66);
    invocation.push(Opcode::PushData1 as u8);
    invocation.push(64);
    invocation.extend_from_slice(&[0u8; 64]);
    Witness {
        invocation,
        verification: Vec::new(),
    }
}

/// Copy of `tx` with one witness per signer.
pub fn cosign(
    tx: &Transaction,
    relay: &SigningAccount,
    counterparty: &WitnessOnlyAccount,
) -> Result<Transaction, CoSigningError> {
    let relay_account = relay.account();
    let counterparty_account = counterparty.account();

    let witnesses = tx
        .signers
        .iter()
        .enumerate()
        .map(|(index, signer)| match signer.account {
            a if a == relay_account => Ok(relay.sign(tx)),
            a if a == counterparty_account => Ok(tx
                .witnesses
                .get(index)
                .filter(|w| !w.is_unsigned() && w.script_hash() == a)
                .cloned()
                .unwrap_or_else(|| counterparty.placeholder())),
            a if a == ScriptHash::NOTARY => Ok(notary_placeholder()),
            _ => Err(CoSigningError::WrongSignerRole { index }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Transaction {
        witnesses,
        ..tx.clone()
    })
}
