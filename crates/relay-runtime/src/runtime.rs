//! # Relay Runtime
//!
//! Builds every subsystem from a [`RelayConfig`] and runs them.
//!
//! ## Startup Sequence
//!
//! 1. Fund the relay account and start producing blocks
//! 2. Deposit fee credit for the relay itself (fatal on failure)
//! 3. Subscribe the orchestrator to notary pool events
//! 4. Serve HTTP until shutdown

use crate::adapters::{InMemoryLedger, PropertiesReader, SideEffectBridge, UnmintedItems};
use crate::api::{router, ApiState};
use crate::config::{ConfigError, RelayConfig};
use anyhow::{Context, Result};
use axum::Router;
use nr_01_admission::{AdmissionApi, AdmissionController};
use nr_02_authenticator::Authenticator;
use nr_03_cosigning::CoSigningOrchestrator;
use nr_04_side_effects::{HttpResourceFetcher, InMemoryObjectStore, SideEffectExecutor};
use shared_bus::{EventFilter, EventSubscriber, EventTopic, InMemoryEventBus};
use shared_crypto::SigningContext;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Side-effect executor as wired in the relay.
pub type RelayExecutor = SideEffectExecutor<HttpResourceFetcher, InMemoryObjectStore, InMemoryLedger>;

/// Orchestrator as wired in the relay.
pub type RelayOrchestrator = CoSigningOrchestrator<
    Authenticator,
    UnmintedItems,
    InMemoryLedger,
    SideEffectBridge<RelayExecutor>,
>;

/// The running relay.
pub struct RelayRuntime {
    config: RelayConfig,
    signer: Arc<dyn SigningContext>,
    bus: Arc<InMemoryEventBus>,
    ledger: Arc<InMemoryLedger>,
    store: Arc<InMemoryObjectStore>,
    admission: Arc<AdmissionController<InMemoryLedger>>,
    orchestrator: Arc<RelayOrchestrator>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RelayRuntime {
    /// Wire all subsystems. Nothing runs until [`RelayRuntime::start`].
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        let signer: Arc<dyn SigningContext> = Arc::new(config.signer()?);
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Arc::new(InMemoryLedger::new(
            config.ledger.clone(),
            config.relay.network_magic,
            config.authenticator.contract,
            config.side_effects.link_method.clone(),
            Arc::clone(&bus),
        ));

        let admission = Arc::new(AdmissionController::new(
            Arc::clone(&ledger),
            Arc::clone(&signer),
            config.deposit.clone(),
        ));

        let fetcher = HttpResourceFetcher::new(&config.side_effects)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let store = Arc::new(InMemoryObjectStore::new());
        let executor = Arc::new(SideEffectExecutor::new(
            config.side_effects.clone(),
            config.authenticator.contract,
            Arc::new(fetcher),
            Arc::clone(&store),
            Arc::clone(&ledger),
            Arc::clone(&signer),
        ));

        let orchestrator = Arc::new(CoSigningOrchestrator::new(
            config.cosigning.clone(),
            Authenticator::new(config.authenticator.clone()),
            UnmintedItems::new(Arc::clone(&ledger)),
            Arc::clone(&ledger),
            Arc::new(SideEffectBridge::new(executor)),
            Arc::clone(&signer),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            signer,
            bus,
            ledger,
            store,
            admission,
            orchestrator,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Start block production, deposit for the relay and start listening
    /// for notary requests.
    pub async fn start(&self) -> Result<JoinHandle<()>> {
        let relay = self.signer.account();
        info!("===========================================");
        info!("  Notary Relay v{}", env!("CARGO_PKG_VERSION"));
        info!("  Account: {}", relay);
        info!("  Contract: {}", self.config.authenticator.contract);
        info!("===========================================");

        self.ledger.fund(relay, self.config.ledger.initial_balance);
        self.ledger.spawn_block_producer(self.shutdown_rx.clone());

        let receipt = self
            .admission
            .ensure_deposit(relay)
            .await
            .context("Notary deposit for the relay account failed")?;
        info!(tx = %receipt.tx_hash, block = receipt.block, "Relay deposit in place");

        let subscription = self
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::NotaryPool]));
        let orchestrator = Arc::clone(&self.orchestrator);
        let handle = tokio::spawn(orchestrator.run(subscription, self.shutdown_rx.clone()));

        info!("Relay started");
        Ok(handle)
    }

    /// Serve HTTP on the configured address until shutdown.
    pub async fn serve(&self) -> Result<()> {
        let addr = self.config.listen_address()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(%addr, "Serving HTTP");

        let mut shutdown = self.shutdown_rx.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await?;
        Ok(())
    }

    /// HTTP router over this relay.
    pub fn router(&self) -> Router {
        router(ApiState::new(
            Arc::clone(&self.admission) as Arc<dyn AdmissionApi>,
            Arc::clone(&self.ledger) as Arc<dyn PropertiesReader>,
        ))
    }

    /// Signal every task to stop.
    pub fn shutdown(&self) {
        info!("Initiating shutdown");
        self.shutdown_tx.send_replace(true);
    }

    /// Active configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The relay's signing context.
    pub fn signer(&self) -> &Arc<dyn SigningContext> {
        &self.signer
    }

    /// Ledger adapter.
    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    /// Object store receiving fetched resources.
    pub fn store(&self) -> &Arc<InMemoryObjectStore> {
        &self.store
    }

    /// Admission controller.
    pub fn admission(&self) -> &Arc<AdmissionController<InMemoryLedger>> {
        &self.admission
    }

    /// Co-signing orchestrator.
    pub fn orchestrator(&self) -> &Arc<RelayOrchestrator> {
        &self.orchestrator
    }
}
