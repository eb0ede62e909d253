//! # Request Screening
//!
//! Expected shape of a counterparty's notary request:
//!
//! ```text
//! main:     signers  [relay (None), counterparty (Global), Notary]
//!           witnesses[_,            counterparty sig,      _     ]
//! fallback: signers  [Notary, counterparty]
//!           script   RET
//!           attrs    Conflicts(main.hash) ...
//! ```

use crate::domain::{CoSigningError, WitnessOnlyAccount};
use shared_types::{NotaryRequest, Opcode, ScriptHash, WitnessScope};

/// Refuse requests the relay submitted itself.
pub fn check_origin(request: &NotaryRequest, relay: &ScriptHash) -> Result<(), CoSigningError> {
    if request.submitter() == *relay {
        return Err(CoSigningError::SelfOriginated);
    }
    Ok(())
}

/// Check signer roles, the counterparty key and the fallback. Returns the
/// counterparty as a witness-only account.
///
/// Assumes the main transaction has three signers.
pub fn check_structure(
    request: &NotaryRequest,
    relay: &ScriptHash,
) -> Result<WitnessOnlyAccount, CoSigningError> {
    let main = &request.main;
    let roles = [
        (Some(*relay), WitnessScope::None),
        (None, WitnessScope::Global),
        (Some(ScriptHash::NOTARY), WitnessScope::None),
    ];
    for (index, (account, scope)) in roles.iter().enumerate() {
        let signer = main
            .signers
            .get(index)
            .ok_or(CoSigningError::WrongSignerRole { index })?;
        let account_ok = account.map_or(true, |a| a == signer.account);
        // The notary signer's scope is not ours to constrain.
        let scope_ok = index == 2 || signer.scope == *scope;
        if !account_ok || !scope_ok {
            return Err(CoSigningError::WrongSignerRole { index });
        }
    }

    let expected = main.signers[1].account;
    let counterparty = main
        .witnesses
        .get(1)
        .and_then(|w| {
            WitnessOnlyAccount::from_verification_script(&w.verification, WitnessScope::Global)
        })
        .ok_or(CoSigningError::UnknownCounterpartyKey)?;
    if counterparty.account() != expected {
        return Err(CoSigningError::CounterpartyMismatch {
            expected,
            derived: counterparty.account(),
        });
    }

    check_fallback(request, &expected)?;
    Ok(counterparty)
}

fn check_fallback(request: &NotaryRequest, counterparty: &ScriptHash) -> Result<(), CoSigningError> {
    let fallback = &request.fallback;
    if fallback.script != [Opcode::Ret as u8] {
        return Err(CoSigningError::FallbackMalformed("script is not a bare RET".into()));
    }
    match fallback.signers.as_slice() {
        [notary, submitter]
            if notary.account == ScriptHash::NOTARY && submitter.account == *counterparty => {}
        _ => {
            return Err(CoSigningError::FallbackMalformed(
                "signers are not [notary, counterparty]".into(),
            ))
        }
    }
    if fallback.conflicts_with() != Some(request.main.hash()) {
        return Err(CoSigningError::FallbackMalformed(
            "does not conflict with the main transaction".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use nr_02_authenticator::{AuthenticatorConfig, CallFlags};
    use shared_crypto::{invocation_script, Secp256k1KeyPair};
    use shared_types::{
        signature_contract, ContractParam, ScriptBuilder, Signer, Transaction, TxAttribute, Witness,
    };

    /// A well-formed mint request from `counterparty` to `relay`.
    pub(crate) fn mint_request(
        relay: ScriptHash,
        counterparty: &Secp256k1KeyPair,
        item: &str,
    ) -> NotaryRequest {
        let script = ScriptBuilder::new()
            .contract_call(
                &AuthenticatorConfig::DEFAULT_CONTRACT,
                "mint",
                CallFlags::ALL.bits(),
                &[
                    ContractParam::Hash160(counterparty.script_hash()),
                    ContractParam::String(item.into()),
                ],
            )
            .build();

        let mut main = Transaction {
            nonce: 7,
            valid_until_block: 100,
            signers: vec![
                Signer::new(relay, WitnessScope::None),
                Signer::new(counterparty.script_hash(), WitnessScope::Global),
                Signer::new(ScriptHash::NOTARY, WitnessScope::None),
            ],
            attributes: vec![TxAttribute::NotaryAssisted { n_keys: 2 }],
            script,
            ..Default::default()
        };
        main.witnesses = vec![
            Witness::default(),
            counterparty.sign_transaction(&main, 0),
            Witness::default(),
        ];

        let mut fallback = Transaction {
            nonce: 8,
            valid_until_block: 100,
            signers: vec![
                Signer::new(ScriptHash::NOTARY, WitnessScope::None),
                Signer::new(counterparty.script_hash(), WitnessScope::None),
            ],
            attributes: vec![
                TxAttribute::NotValidBefore(90),
                TxAttribute::Conflicts(main.hash()),
                TxAttribute::NotaryAssisted { n_keys: 0 },
            ],
            script: vec![Opcode::Ret as u8],
            ..Default::default()
        };
        fallback.witnesses = vec![Witness::default(), counterparty.sign_transaction(&fallback, 0)];

        NotaryRequest {
            main,
            fallback,
            witness: Witness {
                invocation: invocation_script(&counterparty.sign(b"request")),
                verification: signature_contract(&counterparty.public_key()),
            },
        }
    }

    fn relay() -> ScriptHash {
        ScriptHash::new([0xAA; 20])
    }

    #[test]
    fn test_well_formed_request_passes() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let request = mint_request(relay(), &user, "nyancat.gif");
        check_origin(&request, &relay()).unwrap();
        let counterparty = check_structure(&request, &relay()).unwrap();
        assert_eq!(counterparty.public_key(), user.public_key());
    }

    #[test]
    fn test_self_originated() {
        let relay_key = Secp256k1KeyPair::from_bytes([6; 32]).unwrap();
        let request = mint_request(relay_key.script_hash(), &relay_key, "nyancat.gif");
        assert_eq!(
            check_origin(&request, &relay_key.script_hash()),
            Err(CoSigningError::SelfOriginated)
        );
    }

    #[test]
    fn test_wrong_fee_payer() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let request = mint_request(ScriptHash::new([0xBB; 20]), &user, "nyancat.gif");
        assert_eq!(
            check_structure(&request, &relay()),
            Err(CoSigningError::WrongSignerRole { index: 0 })
        );
    }

    #[test]
    fn test_counterparty_scope_must_be_global() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let mut request = mint_request(relay(), &user, "nyancat.gif");
        request.main.signers[1].scope = WitnessScope::CalledByEntry;
        assert_eq!(
            check_structure(&request, &relay()),
            Err(CoSigningError::WrongSignerRole { index: 1 })
        );
    }

    #[test]
    fn test_counterparty_key_mismatch() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let other = Secp256k1KeyPair::from_bytes([9; 32]).unwrap();
        let mut request = mint_request(relay(), &user, "nyancat.gif");
        request.main.witnesses[1].verification = signature_contract(&other.public_key());
        assert!(matches!(
            check_structure(&request, &relay()),
            Err(CoSigningError::CounterpartyMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_counterparty_witness() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let mut request = mint_request(relay(), &user, "nyancat.gif");
        request.main.witnesses.clear();
        assert_eq!(
            check_structure(&request, &relay()),
            Err(CoSigningError::UnknownCounterpartyKey)
        );
    }

    #[test]
    fn test_fallback_with_payload_refused() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let mut request = mint_request(relay(), &user, "nyancat.gif");
        request.fallback.script = request.main.script.clone();
        assert!(matches!(
            check_structure(&request, &relay()),
            Err(CoSigningError::FallbackMalformed(_))
        ));
    }

    #[test]
    fn test_fallback_must_conflict_with_main() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let mut request = mint_request(relay(), &user, "nyancat.gif");
        request.fallback.attributes = vec![TxAttribute::NotValidBefore(90)];
        assert!(matches!(
            check_structure(&request, &relay()),
            Err(CoSigningError::FallbackMalformed(_))
        ));
    }

    #[test]
    fn test_fallback_signers_checked() {
        let user = Secp256k1KeyPair::from_bytes([5; 32]).unwrap();
        let mut request = mint_request(relay(), &user, "nyancat.gif");
        request.fallback.signers.swap(0, 1);
        assert!(matches!(
            check_structure(&request, &relay()),
            Err(CoSigningError::FallbackMalformed(_))
        ));
    }
}
