//! End-to-end checks on realistic mint request scripts.

use nr_02_authenticator::{
    Argument, Authenticator, AuthenticatorConfig, CallFlags, MintIntent, RejectionReason,
    RequestAuthenticator,
};
use shared_types::{ContractParam, ScriptBuilder, ScriptHash, Signer, WitnessScope};

fn request_signers(counterparty: ScriptHash) -> Vec<Signer> {
    vec![
        Signer::new(ScriptHash::new([0xAA; 20]), WitnessScope::None),
        Signer::new(counterparty, WitnessScope::Global),
        Signer::new(ScriptHash::NOTARY, WitnessScope::None),
    ]
}

fn mint_call(method: &str, recipient: &ScriptHash, name: &str) -> Vec<u8> {
    ScriptBuilder::new()
        .contract_call(
            &AuthenticatorConfig::DEFAULT_CONTRACT,
            method,
            CallFlags::ALL.bits(),
            &[
                ContractParam::Hash160(*recipient),
                ContractParam::String(name.to_string()),
            ],
        )
        .build()
}

#[test]
fn mint_call_reconstructs_arguments_in_declaration_order() {
    let recipient = ScriptHash::new([0x42; 20]);
    let auth = Authenticator::default();

    let intent = auth
        .validate(
            &mint_call("mint", &recipient, "nyancoin.gif"),
            &request_signers(recipient),
        )
        .expect("valid mint");

    assert_eq!(intent.contract, AuthenticatorConfig::DEFAULT_CONTRACT);
    assert_eq!(intent.method, "mint");
    assert_eq!(intent.call_flags, CallFlags::ALL);
    assert_eq!(
        intent.args,
        vec![
            Argument::Bytes(recipient.as_bytes().to_vec()),
            Argument::Bytes(b"nyancoin.gif".to_vec()),
        ]
    );

    let mint = MintIntent::try_from(&intent).expect("typed mint");
    assert_eq!(mint.recipient, recipient);
    assert_eq!(mint.item_name, "nyancoin.gif");
}

#[test]
fn burn_call_is_rejected_as_wrong_method() {
    let recipient = ScriptHash::new([0x42; 20]);
    let auth = Authenticator::default();

    let result = auth.validate(
        &mint_call("burn", &recipient, "nyancoin.gif"),
        &request_signers(recipient),
    );

    assert_eq!(
        result,
        Err(RejectionReason::WrongMethod { got: "burn".into() })
    );
}

#[test]
fn call_to_other_contract_is_rejected() {
    let other = ScriptHash::new([0x01; 20]);
    let script = ScriptBuilder::new()
        .contract_call(&other, "mint", CallFlags::ALL.bits(), &[ContractParam::Null])
        .build();

    let result = Authenticator::default().validate(&script, &request_signers(other));

    assert_eq!(
        result,
        Err(RejectionReason::WrongContract {
            got: other.to_string()
        })
    );
}

#[test]
fn gas_transfer_disguised_with_extra_call_is_rejected() {
    // A transfer before the mint call leaves non-push instructions in the prologue.
    let recipient = ScriptHash::new([0x42; 20]);
    let mut builder = ScriptBuilder::new();
    builder.contract_call(
        &ScriptHash::GAS,
        "transfer",
        CallFlags::ALL.bits(),
        &[
            ContractParam::Hash160(ScriptHash::new([0xAA; 20])),
            ContractParam::Hash160(recipient),
            ContractParam::Integer(1_000_000_000),
            ContractParam::Null,
        ],
    );
    let mut script = builder.build();
    script.extend(mint_call("mint", &recipient, "nyancoin.gif"));

    let result = Authenticator::default().validate(&script, &request_signers(recipient));
    assert!(matches!(
        result,
        Err(RejectionReason::BadArgumentEncoding(_))
    ));
}
