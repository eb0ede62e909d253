//! # Simulated Ledger
//!
//! In-process stand-in for a ledger node with the notary subsystem enabled.
//! Implements every ledger-facing port of the relay and publishes what
//! happens on the event bus, the way a subscription transport would.
//!
//! ## Model
//!
//! - Transactions queue until the next `persist_block`.
//! - A queued transaction expires once the height passes its
//!   `valid_until_block`; one with `NotValidBefore(h)` waits for height `h`.
//! - Scripts are decoded, never executed. Three calls are understood:
//!   `GAS.transfer`, `<contract>.mint` and `<contract>.<link method>`.
//!   An empty script (fallback) halts with no effect.
//! - Notary requests sit in a pool until one of their transactions is
//!   submitted fully witnessed, at which point the request leaves the pool.
//!   The notary's own witness is taken as given.

use async_trait::async_trait;
use nr_01_admission::DepositLedger;
use nr_02_authenticator::{
    decode_script, parse_arguments, parse_trailer, Argument, AuthenticatorConfig,
    MIN_ITEM_NAME_LEN,
};
use nr_03_cosigning::NotaryClient;
use nr_04_side_effects::LedgerWriter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_bus::{EventPublisher, InMemoryEventBus, NotaryRequestEvent, RelayEvent};
use shared_crypto::{signature_from_invocation, SigningContext};
use shared_types::{
    parse_signature_contract, ExecutionResult, LedgerError, MempoolEventKind, NotaryRequest,
    ScriptHash, SentTransaction, Signer, Transaction, TxAttribute, TxHash, VmState, WitnessScope,
    GAS_FACTOR,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Simulated ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Block time.
    pub block_interval_ms: u64,
    /// Blocks an ordinary transaction stays valid for.
    pub validity_blocks: u32,
    /// Fee-asset balance the relay account starts with.
    pub initial_balance: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_interval_ms: 1000,
            validity_blocks: 100,
            initial_balance: 1_000 * GAS_FACTOR,
        }
    }
}

/// A minted item as the contract stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// SHA-256 of the name.
    pub id: Vec<u8>,
    /// Item name.
    pub name: String,
    /// Current owner.
    pub owner: ScriptHash,
    /// Height it was minted at.
    pub created: u32,
    /// Artifact address, once linked.
    pub address: Option<String>,
}

impl ItemRecord {
    /// Token id of `name`.
    pub fn id_for(name: &str) -> Vec<u8> {
        Sha256::digest(name.as_bytes()).to_vec()
    }

    fn properties(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut props = vec![
            (b"id".to_vec(), self.id.clone()),
            (b"name".to_vec(), self.name.clone().into_bytes()),
            (b"owner".to_vec(), self.owner.to_le_hex().into_bytes()),
            (b"created".to_vec(), self.created.to_string().into_bytes()),
        ];
        if let Some(address) = &self.address {
            props.push((b"address".to_vec(), address.clone().into_bytes()));
        }
        props
    }
}

/// Read access to contract item properties.
#[async_trait]
pub trait PropertiesReader: Send + Sync {
    /// Raw key/value pairs `properties(id)` returns.
    async fn properties(&self, id: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError>;
}

#[derive(Default)]
struct LedgerState {
    height: u32,
    nonce: u32,
    balances: HashMap<ScriptHash, i64>,
    deposits: HashMap<ScriptHash, i64>,
    queue: Vec<Transaction>,
    executed: HashMap<TxHash, ExecutionResult>,
    included: Vec<Transaction>,
    pool: HashMap<TxHash, NotaryRequest>,
    items: BTreeMap<Vec<u8>, ItemRecord>,
}

/// A call decoded from a script.
struct Call {
    contract: ScriptHash,
    method: String,
    args: Vec<Argument>,
}

/// In-process ledger.
pub struct InMemoryLedger {
    config: LedgerConfig,
    network_magic: u32,
    contract: ScriptHash,
    link_method: String,
    bus: Arc<InMemoryEventBus>,
    state: Mutex<LedgerState>,
    heights: watch::Sender<u32>,
}

impl InMemoryLedger {
    /// Ledger for `network_magic` hosting the item contract at `contract`.
    pub fn new(
        config: LedgerConfig,
        network_magic: u32,
        contract: ScriptHash,
        link_method: impl Into<String>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        let (heights, _) = watch::channel(0);
        Self {
            config,
            network_magic,
            contract,
            link_method: link_method.into(),
            bus,
            state: Mutex::new(LedgerState::default()),
            heights,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Credit `amount` of the fee asset to `account`.
    pub fn fund(&self, account: ScriptHash, amount: i64) {
        *self.state.lock().balances.entry(account).or_default() += amount;
    }

    /// Current height.
    pub fn height(&self) -> u32 {
        self.state.lock().height
    }

    /// Notary deposit held for `account`.
    pub fn deposit_of(&self, account: &ScriptHash) -> i64 {
        self.state.lock().deposits.get(account).copied().unwrap_or(0)
    }

    /// Execution result of `hash`, if it was included.
    pub fn execution(&self, hash: &TxHash) -> Option<ExecutionResult> {
        self.state.lock().executed.get(hash).cloned()
    }

    /// Every transaction included so far, in block order.
    pub fn included(&self) -> Vec<Transaction> {
        self.state.lock().included.clone()
    }

    /// Item minted under `name`, if any.
    pub fn item(&self, name: &str) -> Option<ItemRecord> {
        self.state.lock().items.get(&ItemRecord::id_for(name)).cloned()
    }

    /// Is `name` already minted?
    pub fn item_exists(&self, name: &str) -> bool {
        self.state.lock().items.contains_key(&ItemRecord::id_for(name))
    }

    /// Requests waiting in the notary pool.
    pub fn pool_len(&self) -> usize {
        self.state.lock().pool.len()
    }

    /// Accept a counterparty's notary request into the pool.
    ///
    /// The fallback's payer must hold a deposit.
    pub async fn submit_notary_request(&self, request: NotaryRequest) -> Result<TxHash, LedgerError> {
        let hash = request.hash();
        {
            let mut state = self.state.lock();
            let payer = request
                .fallback
                .signers
                .get(1)
                .map(|s| s.account)
                .ok_or_else(|| LedgerError::Rejected("fallback has no payer".into()))?;
            if state.deposits.get(&payer).copied().unwrap_or(0) <= 0 {
                return Err(LedgerError::Rejected(format!(
                    "no notary deposit for {payer}"
                )));
            }
            if state.pool.contains_key(&hash) {
                return Err(LedgerError::Rejected(format!("request {hash} already pooled")));
            }
            state.pool.insert(hash, request.clone());
        }
        debug!(request = %hash, "[ledger] Notary request pooled");
        self.bus
            .publish(RelayEvent::NotaryRequest(NotaryRequestEvent {
                kind: MempoolEventKind::Added,
                request,
            }))
            .await;
        Ok(hash)
    }

    /// Include every eligible queued transaction in a new block.
    pub async fn persist_block(&self) -> u32 {
        let (height, results) = {
            let mut state = self.state.lock();
            let height = state.height + 1;
            let queue = std::mem::take(&mut state.queue);
            let mut results = Vec::new();
            for tx in queue {
                if tx.valid_until_block < height {
                    debug!(tx = %tx.hash(), "[ledger] Transaction expired");
                    continue;
                }
                if not_valid_before(&tx).is_some_and(|nvb| nvb > height) {
                    state.queue.push(tx);
                    continue;
                }
                let result = self.execute(&mut state, &tx, height);
                state.executed.insert(result.tx_hash, result.clone());
                state.included.push(tx);
                results.push(result);
            }
            state.height = height;
            (height, results)
        };

        self.heights.send_replace(height);
        self.bus
            .publish(RelayEvent::BlockPersisted { height })
            .await;
        for result in results {
            self.bus.publish(RelayEvent::TransactionExecuted(result)).await;
        }
        height
    }

    /// Persist a block every `block_interval_ms` until `shutdown` fires.
    pub fn spawn_block_producer(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let ledger = Arc::clone(self);
        let period = Duration::from_millis(ledger.config.block_interval_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        ledger.persist_block().await;
                    }
                }
            }
            info!("[ledger] Block producer stopped");
        })
    }

    async fn wait_for(&self, hashes: &[TxHash], valid_until_block: u32) -> Result<ExecutionResult, LedgerError> {
        let mut heights = self.heights.subscribe();
        loop {
            heights.borrow_and_update();
            {
                let state = self.state.lock();
                if let Some(result) = hashes.iter().find_map(|h| state.executed.get(h)) {
                    return Ok(result.clone());
                }
                if state.height >= valid_until_block {
                    return Err(LedgerError::Expired { valid_until_block });
                }
            }
            heights
                .changed()
                .await
                .map_err(|_| LedgerError::Rpc("ledger stopped".into()))?;
        }
    }

    fn queue_signed(&self, script: Vec<u8>, signer: &dyn SigningContext) -> Result<SentTransaction, LedgerError> {
        if signer.network_magic() != self.network_magic {
            return Err(LedgerError::Rejected(format!(
                "wrong network magic {}",
                signer.network_magic()
            )));
        }
        let mut state = self.state.lock();
        state.nonce += 1;
        let mut tx = Transaction {
            nonce: state.nonce,
            valid_until_block: state.height + self.config.validity_blocks,
            signers: vec![Signer::new(signer.account(), WitnessScope::CalledByEntry)],
            script,
            ..Default::default()
        };
        tx.witnesses = vec![signer.sign(&tx)];
        let sent = SentTransaction {
            hash: tx.hash(),
            valid_until_block: tx.valid_until_block,
        };
        state.queue.push(tx);
        Ok(sent)
    }

    fn check_witnesses(&self, tx: &Transaction) -> Result<(), LedgerError> {
        if tx.witnesses.len() != tx.signers.len() {
            return Err(LedgerError::Rejected(format!(
                "{} witnesses for {} signers",
                tx.witnesses.len(),
                tx.signers.len()
            )));
        }
        let message = tx.signing_message(self.network_magic);
        for (signer, witness) in tx.signers.iter().zip(&tx.witnesses) {
            if signer.account == ScriptHash::NOTARY {
                continue;
            }
            let valid = witness.script_hash() == signer.account
                && match (
                    parse_signature_contract(&witness.verification),
                    signature_from_invocation(&witness.invocation),
                ) {
                    (Some(key), Some(sig)) => sig.verify(&key, &message).is_ok(),
                    _ => false,
                };
            if !valid {
                return Err(LedgerError::Rejected(format!(
                    "invalid witness for {}",
                    signer.account
                )));
            }
        }
        Ok(())
    }

    fn decode_call(&self, script: &[u8]) -> Result<Option<Call>, String> {
        let stream = decode_script(script).map_err(|e| e.to_string())?;
        if stream.is_empty() {
            return Ok(None);
        }
        let known = [
            (ScriptHash::GAS, "transfer"),
            (self.contract, "mint"),
            (self.contract, self.link_method.as_str()),
        ];
        for (contract, method) in known {
            let expected = AuthenticatorConfig {
                contract,
                method: method.to_string(),
            };
            if let Ok((trailer, prologue)) = parse_trailer(stream.as_slice(), &expected) {
                let args = parse_arguments(prologue).map_err(|e| e.to_string())?;
                return Ok(Some(Call {
                    contract: trailer.contract,
                    method: trailer.method,
                    args,
                }));
            }
        }
        Err("unsupported call".into())
    }

    fn execute(&self, state: &mut LedgerState, tx: &Transaction, height: u32) -> ExecutionResult {
        let outcome = self.apply(state, tx, height);
        if let Err(reason) = &outcome {
            warn!(tx = %tx.hash(), %reason, "[ledger] Transaction faulted");
        }
        ExecutionResult {
            tx_hash: tx.hash(),
            block: height,
            vm_state: if outcome.is_ok() {
                VmState::Halt
            } else {
                VmState::Fault
            },
            exception: outcome.err(),
        }
    }

    fn apply(&self, state: &mut LedgerState, tx: &Transaction, height: u32) -> Result<(), String> {
        if tx.attributes
            .iter()
            .any(|a| matches!(a, TxAttribute::NotaryAssisted { .. }))
        {
            charge_notary_fee(state, tx)?;
        }
        let Some(call) = self.decode_call(&tx.script)? else {
            return Ok(());
        };
        match (call.contract, call.method.as_str()) {
            (ScriptHash::GAS, "transfer") => transfer(state, tx, &call.args),
            (c, "mint") if c == self.contract => mint(state, &call.args, height),
            (c, m) if c == self.contract && m == self.link_method => link(state, &call.args),
            (c, m) => Err(format!("unsupported call {c}.{m}")),
        }
    }
}

fn not_valid_before(tx: &Transaction) -> Option<u32> {
    tx.attributes.iter().find_map(|a| match a {
        TxAttribute::NotValidBefore(h) => Some(*h),
        _ => None,
    })
}

/// Fallbacks are paid for by their second signer, main transactions by
/// their sender.
fn charge_notary_fee(state: &mut LedgerState, tx: &Transaction) -> Result<(), String> {
    let payer = match tx.signers.as_slice() {
        [first, second, ..] if first.account == ScriptHash::NOTARY => second.account,
        [first, ..] => first.account,
        [] => return Err("no signers".into()),
    };
    let deposit = state.deposits.entry(payer).or_default();
    if *deposit < tx.network_fee {
        return Err(format!("insufficient notary deposit for {payer}"));
    }
    *deposit -= tx.network_fee;
    Ok(())
}

fn hash_arg(arg: Option<&Argument>) -> Result<ScriptHash, String> {
    arg.and_then(Argument::as_bytes)
        .ok_or_else(|| "expected a hash".to_string())
        .and_then(|b| ScriptHash::from_slice(b).map_err(|e| e.to_string()))
}

fn string_arg(arg: Option<&Argument>) -> Result<String, String> {
    arg.and_then(Argument::as_bytes)
        .ok_or_else(|| "expected a string".to_string())
        .and_then(|b| String::from_utf8(b.to_vec()).map_err(|e| e.to_string()))
}

fn transfer(state: &mut LedgerState, tx: &Transaction, args: &[Argument]) -> Result<(), String> {
    let [from, to, amount, data] = args else {
        return Err(format!("transfer takes 4 arguments, got {}", args.len()));
    };
    let from = hash_arg(Some(from))?;
    let to = hash_arg(Some(to))?;
    let amount = match amount {
        Argument::Integer(i) => i.to_i64().ok_or("amount out of range")?,
        _ => return Err("amount is not an integer".into()),
    };
    if amount < 0 {
        return Err("negative amount".into());
    }
    if !tx.signers.iter().any(|s| s.account == from) {
        return Err(format!("no witness for {from}"));
    }
    let balance = state.balances.entry(from).or_default();
    if *balance < amount {
        return Err(format!("insufficient funds: {balance} < {amount}"));
    }
    *balance -= amount;
    *state.balances.entry(to).or_default() += amount;

    if to == ScriptHash::NOTARY {
        let beneficiary = match data {
            Argument::Array(items) if !items.is_empty() => hash_arg(items.first())?,
            _ => from,
        };
        *state.deposits.entry(beneficiary).or_default() += amount;
    }
    Ok(())
}

fn mint(state: &mut LedgerState, args: &[Argument], height: u32) -> Result<(), String> {
    let [owner, name] = args else {
        return Err(format!("mint takes 2 arguments, got {}", args.len()));
    };
    let owner = hash_arg(Some(owner))?;
    let name = string_arg(Some(name))?;
    if name.chars().count() < MIN_ITEM_NAME_LEN {
        return Err(format!("name too short: {name}"));
    }
    let id = ItemRecord::id_for(&name);
    if state.items.contains_key(&id) {
        return Err(format!("token already exists: {name}"));
    }
    state.items.insert(
        id.clone(),
        ItemRecord {
            id,
            name,
            owner,
            created: height,
            address: None,
        },
    );
    Ok(())
}

fn link(state: &mut LedgerState, args: &[Argument]) -> Result<(), String> {
    let [name, address] = args else {
        return Err(format!("link takes 2 arguments, got {}", args.len()));
    };
    let name = string_arg(Some(name))?;
    let address = string_arg(Some(address))?;
    let item = state
        .items
        .get_mut(&ItemRecord::id_for(&name))
        .ok_or_else(|| format!("unknown token: {name}"))?;
    item.address = Some(address);
    Ok(())
}

#[async_trait]
impl DepositLedger for InMemoryLedger {
    async fn send(
        &self,
        script: Vec<u8>,
        signer: &dyn SigningContext,
    ) -> Result<SentTransaction, LedgerError> {
        self.queue_signed(script, signer)
    }

    async fn wait(&self, sent: &SentTransaction) -> Result<ExecutionResult, LedgerError> {
        self.wait_for(&[sent.hash], sent.valid_until_block).await
    }

    async fn balance_of(&self, asset: ScriptHash, account: ScriptHash) -> Result<i64, LedgerError> {
        if asset != ScriptHash::GAS {
            return Err(LedgerError::UnexpectedResult(format!("unknown asset {asset}")));
        }
        Ok(self.state.lock().balances.get(&account).copied().unwrap_or(0))
    }
}

#[async_trait]
impl LedgerWriter for InMemoryLedger {
    async fn send(
        &self,
        script: Vec<u8>,
        signer: &dyn SigningContext,
    ) -> Result<SentTransaction, LedgerError> {
        self.queue_signed(script, signer)
    }

    async fn wait(&self, sent: &SentTransaction) -> Result<ExecutionResult, LedgerError> {
        self.wait_for(&[sent.hash], sent.valid_until_block).await
    }
}

#[async_trait]
impl NotaryClient for InMemoryLedger {
    async fn submit(&self, tx: Transaction) -> Result<SentTransaction, LedgerError> {
        self.check_witnesses(&tx)?;
        let hash = tx.hash();
        let request = {
            let mut state = self.state.lock();
            let key = state
                .pool
                .iter()
                .find(|(_, r)| r.main.hash() == hash || r.fallback.hash() == hash)
                .map(|(k, _)| *k)
                .ok_or_else(|| LedgerError::Rejected(format!("{hash} is not part of a pooled request")))?;
            let request = state.pool.remove(&key);
            state.queue.push(tx.clone());
            request
        };
        if let Some(request) = request {
            self.bus
                .publish(RelayEvent::NotaryRequest(NotaryRequestEvent {
                    kind: MempoolEventKind::Removed,
                    request,
                }))
                .await;
        }
        debug!(tx = %hash, "[ledger] Notarized transaction queued");
        Ok(SentTransaction {
            hash,
            valid_until_block: tx.valid_until_block,
        })
    }

    async fn wait_any(
        &self,
        main: TxHash,
        fallback: TxHash,
        valid_until_block: u32,
    ) -> Result<ExecutionResult, LedgerError> {
        self.wait_for(&[main, fallback], valid_until_block).await
    }
}

#[async_trait]
impl PropertiesReader for InMemoryLedger {
    async fn properties(&self, id: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError> {
        self.state
            .lock()
            .items
            .get(id)
            .map(ItemRecord::properties)
            .ok_or_else(|| LedgerError::Faulted(format!("token not found: {}", hex::encode(id))))
    }
}
