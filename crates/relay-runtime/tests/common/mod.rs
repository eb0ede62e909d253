//! Shared fixtures for relay flow tests.

#![allow(dead_code)]

use axum::extract::Path;
use axum::routing::get;
use axum::Router;
use nr_02_authenticator::{decode_script, parse_trailer, AuthenticatorConfig, CallFlags};
use relay_runtime::{RelayConfig, RelayRuntime};
use shared_crypto::{invocation_script, Secp256k1KeyPair};
use shared_types::{
    signature_contract, ContractParam, NotaryRequest, Opcode, PublicKey, ScriptBuilder, ScriptHash,
    Signer, Transaction, TxAttribute, Witness, WitnessScope,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const MAGIC: u32 = 5_195_086;
pub const RELAY_KEY: [u8; 32] = [0x11; 32];

/// Origin serving a small GIF for any name, counting requests.
pub struct ResourceServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl ResourceServer {
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/cats/:name",
            get(move |Path(name): Path<String>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ([("content-type", "image/gif")], format!("GIF89a {name}"))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}/cats/"),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn config(resource_base_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.relay.secret_key = hex::encode(RELAY_KEY);
    config.relay.network_magic = MAGIC;
    config.relay.listen_address = "127.0.0.1:0".to_string();
    config.side_effects.resource_base_url = resource_base_url.to_string();
    config.side_effects.fetch_timeout_secs = 5;
    config.ledger.block_interval_ms = 20;
    config
}

pub async fn started(resource_base_url: &str) -> RelayRuntime {
    let runtime = RelayRuntime::new(config(resource_base_url)).unwrap();
    runtime.start().await.unwrap();
    runtime
}

pub fn relay_public_key() -> PublicKey {
    Secp256k1KeyPair::from_bytes(RELAY_KEY).unwrap().public_key()
}

/// Poll `check` until it holds or five seconds pass.
pub async fn eventually(what: &str, check: impl Fn() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

/// A counterparty's `mint(recipient, item)` request as a wallet would
/// build it: main signed by the counterparty, fallback paying from its
/// deposit and valid from `height + 2`.
pub fn mint_request(
    relay: ScriptHash,
    counterparty: &Secp256k1KeyPair,
    contract: &ScriptHash,
    item: &str,
    height: u32,
) -> NotaryRequest {
    let script = ScriptBuilder::new()
        .contract_call(
            contract,
            "mint",
            CallFlags::ALL.bits(),
            &[
                ContractParam::Hash160(counterparty.script_hash()),
                ContractParam::String(item.to_string()),
            ],
        )
        .build();

    let mut main = Transaction {
        nonce: height.wrapping_mul(31).wrapping_add(1),
        valid_until_block: height + 50,
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
        counterparty.sign_transaction(&main, MAGIC),
        Witness::default(),
    ];

    let mut fallback = Transaction {
        nonce: height.wrapping_mul(31).wrapping_add(2),
        valid_until_block: height + 50,
        signers: vec![
            Signer::new(ScriptHash::NOTARY, WitnessScope::None),
            Signer::new(counterparty.script_hash(), WitnessScope::None),
        ],
        attributes: vec![
            TxAttribute::NotValidBefore(height + 2),
            TxAttribute::Conflicts(main.hash()),
            TxAttribute::NotaryAssisted { n_keys: 0 },
        ],
        script: vec![Opcode::Ret as u8],
        ..Default::default()
    };
    fallback.witnesses = vec![Witness::default(), counterparty.sign_transaction(&fallback, MAGIC)];

    NotaryRequest {
        main,
        fallback,
        witness: Witness {
            invocation: invocation_script(&counterparty.sign(b"request")),
            verification: signature_contract(&counterparty.public_key()),
        },
    }
}

/// Included transactions calling `contract.method`.
pub fn calls_to(included: &[Transaction], contract: &ScriptHash, method: &str) -> usize {
    let expected = AuthenticatorConfig {
        contract: *contract,
        method: method.to_string(),
    };
    included
        .iter()
        .filter(|tx| {
            decode_script(&tx.script)
                .map(|stream| parse_trailer(stream.as_slice(), &expected).is_ok())
                .unwrap_or(false)
        })
        .count()
}
