//! # Co-Signing Orchestrator Service
//!
//! Consumes notary pool events and drives each accepted request through
//! [`RequestState`] to a terminal state.
//!
//! ## Ordering
//!
//! With `max_concurrent_requests == 1` each event is processed to completion
//! before the next is read. Above that, requests start in delivery order on
//! spawned tasks, bounded by a semaphore; completions may interleave.
//!
//! ## Cancellation
//!
//! The shutdown signal stops the loop. A request still waiting on the
//! ledger is abandoned; nothing is persisted.

use crate::algorithms::{check_origin, check_structure, cosign};
use crate::domain::{
    AdmissionPolicy, CoSigningConfig, CoSigningError, FinalizedMint, InFlightRegistry,
    OrchestratorStats, Path, RequestOutcome, RequestState, SigningAccount, TrackedRequest,
};
use crate::ports::{CoSigningApi, FinalizationHandler, NotaryClient};
use async_trait::async_trait;
use nr_02_authenticator::{MintIntent, RequestAuthenticator};
use shared_bus::{NotaryRequestEvent, RelayEvent, Subscription};
use shared_crypto::SigningContext;
use shared_types::{MempoolEventKind, NotaryRequest, WitnessScope};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    rejected: AtomicU64,
    primary: AtomicU64,
    fallback: AtomicU64,
    failed: AtomicU64,
    side_effect_failures: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &RequestOutcome) {
        let counter = match outcome {
            RequestOutcome::Finalized(Path::Primary) => &self.primary,
            RequestOutcome::Finalized(Path::Fallback) => &self.fallback,
            RequestOutcome::Rejected(_) => &self.rejected,
            RequestOutcome::Failed(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OrchestratorStats {
        OrchestratorStats {
            received: self.received.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            primary: self.primary.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            side_effect_failures: self.side_effect_failures.load(Ordering::Relaxed),
        }
    }
}

/// Co-Signing Orchestrator.
///
/// ## Dependencies
///
/// - `A: RequestAuthenticator` - main script validation
/// - `P: AdmissionPolicy` - primary or fallback
/// - `N: NotaryClient` - submission and resolution
/// - `H: FinalizationHandler` - side effects after a primary finalization
pub struct CoSigningOrchestrator<A, P, N, H>
where
    A: RequestAuthenticator,
    P: AdmissionPolicy,
    N: NotaryClient,
    H: FinalizationHandler,
{
    config: CoSigningConfig,
    authenticator: A,
    policy: P,
    notary: Arc<N>,
    handler: Arc<H>,
    relay: SigningAccount,
    registry: Arc<InFlightRegistry>,
    permits: Arc<Semaphore>,
    counters: Counters,
}

impl<A, P, N, H> CoSigningOrchestrator<A, P, N, H>
where
    A: RequestAuthenticator,
    P: AdmissionPolicy,
    N: NotaryClient,
    H: FinalizationHandler,
{
    /// Wire an orchestrator signing through `signer`.
    pub fn new(
        config: CoSigningConfig,
        authenticator: A,
        policy: P,
        notary: Arc<N>,
        handler: Arc<H>,
        signer: Arc<dyn SigningContext>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_requests.max(1)));
        Self {
            config,
            authenticator,
            policy,
            notary,
            handler,
            relay: SigningAccount::new(signer, WitnessScope::None),
            registry: Arc::new(InFlightRegistry::new()),
            permits,
            counters: Counters::default(),
        }
    }

    /// Items currently between path choice and completion.
    pub fn in_flight(&self) -> &Arc<InFlightRegistry> {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &CoSigningConfig {
        &self.config
    }

    async fn process(&self, request: &NotaryRequest) -> RequestOutcome {
        let mut tracked = TrackedRequest::new(request.hash());
        let outcome = match self.drive(request, &mut tracked).await {
            Ok(path) => {
                info!(request = %tracked.hash, %path, "[nr-03] Request finalized");
                RequestOutcome::Finalized(path)
            }
            Err(err) if err.is_rejection() => {
                warn!(request = %tracked.hash, error = %err, "[nr-03] Request rejected");
                tracked.abandon(&err);
                RequestOutcome::Rejected(err)
            }
            Err(err) => {
                error!(
                    request = %tracked.hash,
                    state = %tracked.state(),
                    error = %err,
                    "[nr-03] Request failed"
                );
                tracked.abandon(&err);
                RequestOutcome::Failed(err)
            }
        };
        self.counters.record(&outcome);
        outcome
    }

    async fn drive(
        &self,
        request: &NotaryRequest,
        tracked: &mut TrackedRequest,
    ) -> Result<Path, CoSigningError> {
        let relay = self.relay.account();
        check_origin(request, &relay)?;

        let intent = self
            .authenticator
            .validate(&request.main.script, &request.main.signers)?;
        let mint = MintIntent::try_from(&intent)?;
        let counterparty = check_structure(request, &relay)?;
        tracked.advance(RequestState::Authenticated)?;
        debug!(
            request = %tracked.hash,
            item = %mint.item_name,
            recipient = %mint.recipient,
            "[nr-03] Authenticated"
        );

        let _guard = self
            .registry
            .try_acquire(&mint.item_name)
            .ok_or_else(|| CoSigningError::ItemBusy(mint.item_name.clone()))?;

        let chosen = if self.policy.admit(&mint) {
            Path::Primary
        } else {
            Path::Fallback
        };
        tracked.advance(RequestState::PathChosen(chosen))?;

        let target = match chosen {
            Path::Primary => &request.main,
            Path::Fallback => &request.fallback,
        };
        let signed = cosign(target, &self.relay, &counterparty)?;
        tracked.advance(RequestState::Signed(chosen))?;

        let main_hash = request.main.hash();
        let fallback_hash = request.fallback.hash();
        let sent = self.notary.submit(signed).await?;
        tracked.advance(RequestState::Submitted(chosen))?;
        info!(
            request = %tracked.hash,
            path = %chosen,
            main = %main_hash,
            fallback = %fallback_hash,
            vub = sent.valid_until_block,
            "[nr-03] Notarize sent"
        );

        let result = self
            .notary
            .wait_any(main_hash, fallback_hash, sent.valid_until_block)
            .await?;
        let path = if result.tx_hash == main_hash {
            Path::Primary
        } else if result.tx_hash == fallback_hash {
            Path::Fallback
        } else {
            return Err(CoSigningError::UnrelatedResolution(result.tx_hash));
        };
        if !result.is_halt() {
            return Err(CoSigningError::Faulted {
                tx_hash: result.tx_hash,
                reason: result.exception.clone().unwrap_or_default(),
            });
        }
        tracked.advance(RequestState::Finalized(path))?;

        if path == Path::Primary {
            let finalized = FinalizedMint {
                request: tracked.hash,
                intent: mint,
                result,
            };
            if let Err(err) = self.handler.on_primary_finalized(&finalized).await {
                self.counters
                    .side_effect_failures
                    .fetch_add(1, Ordering::Relaxed);
                error!(
                    request = %tracked.hash,
                    item = %finalized.intent.item_name,
                    error = %err,
                    "[nr-03] Side effects failed; item left without an address"
                );
            }
        }
        Ok(path)
    }
}

impl<A, P, N, H> CoSigningOrchestrator<A, P, N, H>
where
    A: RequestAuthenticator + 'static,
    P: AdmissionPolicy + 'static,
    N: NotaryClient + 'static,
    H: FinalizationHandler + 'static,
{
    /// Consume `subscription` until it closes or `shutdown` fires.
    pub async fn run(
        self: Arc<Self>,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            max_concurrent = self.config.max_concurrent_requests,
            relay = %self.relay.account(),
            "[nr-03] Listening for notary requests"
        );

        loop {
            let event = tokio::select! {
                _ = shutdown.changed() => break,
                event = subscription.recv() => event,
            };
            let event = match event {
                Some(RelayEvent::NotaryRequest(event)) => event,
                Some(_) => continue,
                None => {
                    warn!("[nr-03] Event stream closed");
                    return;
                }
            };

            if self.config.max_concurrent_requests <= 1 {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = self.handle_request(&event) => {}
                }
                continue;
            }

            let permit = tokio::select! {
                _ = shutdown.changed() => break,
                permit = Arc::clone(&self.permits).acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                break;
            };
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                this.handle_request(&event).await;
                drop(permit);
            });
        }

        info!("[nr-03] Shutdown signal received");
    }
}

#[async_trait]
impl<A, P, N, H> CoSigningApi for CoSigningOrchestrator<A, P, N, H>
where
    A: RequestAuthenticator,
    P: AdmissionPolicy,
    N: NotaryClient,
    H: FinalizationHandler,
{
    async fn handle_request(&self, event: &NotaryRequestEvent) -> Option<RequestOutcome> {
        if event.kind != MempoolEventKind::Added {
            debug!(request = %event.request.hash(), "[nr-03] Ignoring pool removal");
            return None;
        }
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        Some(self.process(&event.request).await)
    }

    fn stats(&self) -> OrchestratorStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::screening::tests::mint_request;
    use crate::domain::AlwaysAdmit;
    use crate::ports::{MockFinalizationHandler, MockNotaryClient};
    use nr_02_authenticator::{Authenticator, RejectionReason};
    use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBus};
    use shared_crypto::{LocalSigner, Secp256k1KeyPair};
    use shared_types::{LedgerError, ScriptHash};
    use std::time::Duration;

    type TestOrchestrator<P> =
        CoSigningOrchestrator<Authenticator, P, MockNotaryClient, MockFinalizationHandler>;

    fn signer() -> Arc<dyn SigningContext> {
        Arc::new(LocalSigner::new(Secp256k1KeyPair::from_bytes([0x11; 32]).unwrap(), 0))
    }

    fn user() -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_bytes([0x22; 32]).unwrap()
    }

    fn orchestrator_with<P: AdmissionPolicy>(
        policy: P,
        notary: MockNotaryClient,
    ) -> TestOrchestrator<P> {
        CoSigningOrchestrator::new(
            CoSigningConfig::default(),
            Authenticator::default(),
            policy,
            Arc::new(notary),
            Arc::new(MockFinalizationHandler::default()),
            signer(),
        )
    }

    fn orchestrator() -> TestOrchestrator<AlwaysAdmit> {
        orchestrator_with(AlwaysAdmit, MockNotaryClient::default())
    }

    fn added(request: NotaryRequest) -> NotaryRequestEvent {
        NotaryRequestEvent {
            kind: MempoolEventKind::Added,
            request,
        }
    }

    fn relay_account() -> ScriptHash {
        signer().account()
    }

    #[tokio::test]
    async fn test_primary_finalization_invokes_handler_once() {
        let orch = orchestrator();
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request.clone())).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Finalized(Path::Primary));
        let calls = orch.handler.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].intent.item_name, "nyancat.gif");
        assert_eq!(calls[0].intent.recipient, user().script_hash());
        assert_eq!(calls[0].request, request.hash());

        let submitted = orch.notary.submitted.lock();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].hash(), request.main.hash());
        assert!(!submitted[0].witnesses[0].is_unsigned());
        assert!(orch.in_flight().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_finalization_skips_handler() {
        let orch = orchestrator_with(
            AlwaysAdmit,
            MockNotaryClient {
                finalize: Some(Path::Fallback),
                ..Default::default()
            },
        );
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Finalized(Path::Fallback));
        assert!(orch.handler.calls.lock().is_empty());
        assert_eq!(orch.stats().fallback, 1);
    }

    #[tokio::test]
    async fn test_refused_request_signs_fallback() {
        let orch = orchestrator_with(|_: &MintIntent| false, MockNotaryClient::default());
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request.clone())).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Finalized(Path::Fallback));
        assert_eq!(orch.notary.submitted.lock()[0].hash(), request.fallback.hash());
        assert!(orch.handler.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_self_originated_never_authenticated() {
        let orch = orchestrator();
        // Garbage script: reaching the authenticator would yield a decode error.
        let relay_key = Secp256k1KeyPair::from_bytes([0x11; 32]).unwrap();
        let mut request = mint_request(relay_account(), &relay_key, "nyancat.gif");
        request.main.script = vec![0xFF];

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Rejected(CoSigningError::SelfOriginated));
        assert!(orch.notary.submitted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_method_rejected() {
        let orch = orchestrator();
        let mut request = mint_request(relay_account(), &user(), "nyancat.gif");
        let pos = request
            .main
            .script
            .windows(4)
            .position(|w| w == b"mint")
            .unwrap();
        request.main.script[pos..pos + 4].copy_from_slice(b"burn");

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert_eq!(
            outcome,
            RequestOutcome::Rejected(CoSigningError::Authentication(
                RejectionReason::WrongMethod { got: "burn".into() }
            ))
        );
        assert_eq!(orch.stats().rejected, 1);
    }

    #[tokio::test]
    async fn test_busy_item_fails_fast() {
        let orch = orchestrator();
        let _held = orch.in_flight().try_acquire("nyancat.gif").unwrap();
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert_eq!(
            outcome,
            RequestOutcome::Rejected(CoSigningError::ItemBusy("nyancat.gif".into()))
        );
        assert!(orch.notary.submitted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_expiry_is_failure() {
        let orch = orchestrator_with(
            AlwaysAdmit,
            MockNotaryClient {
                expire: true,
                ..Default::default()
            },
        );
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert!(matches!(
            outcome,
            RequestOutcome::Failed(CoSigningError::Ledger(LedgerError::Expired { .. }))
        ));
        assert!(orch.handler.calls.lock().is_empty());
        assert!(orch.in_flight().is_empty());
    }

    #[tokio::test]
    async fn test_faulted_main_skips_handler() {
        let orch = orchestrator_with(
            AlwaysAdmit,
            MockNotaryClient {
                fault: true,
                ..Default::default()
            },
        );
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert!(matches!(outcome, RequestOutcome::Failed(CoSigningError::Faulted { .. })));
        assert!(orch.handler.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_side_effect_failure_counted() {
        let orch = CoSigningOrchestrator::new(
            CoSigningConfig::default(),
            Authenticator::default(),
            AlwaysAdmit,
            Arc::new(MockNotaryClient::default()),
            Arc::new(MockFinalizationHandler {
                should_fail: true,
                ..Default::default()
            }),
            signer(),
        );
        let request = mint_request(relay_account(), &user(), "nyancat.gif");

        let outcome = orch.handle_request(&added(request)).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Finalized(Path::Primary));
        assert_eq!(orch.stats().side_effect_failures, 1);
    }

    #[tokio::test]
    async fn test_removal_ignored() {
        let orch = orchestrator();
        let event = NotaryRequestEvent {
            kind: MempoolEventKind::Removed,
            request: mint_request(relay_account(), &user(), "nyancat.gif"),
        };
        assert!(orch.handle_request(&event).await.is_none());
        assert_eq!(orch.stats(), OrchestratorStats::default());
    }

    #[tokio::test]
    async fn test_run_loop_processes_bus_events_until_shutdown() {
        let bus = InMemoryEventBus::new();
        let orch = Arc::new(orchestrator());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let subscription = bus.subscribe(EventFilter::all());
        let task = tokio::spawn(Arc::clone(&orch).run(subscription, shutdown_rx));

        bus.publish(RelayEvent::BlockPersisted { height: 1 }).await;
        bus.publish(RelayEvent::NotaryRequest(added(mint_request(
            relay_account(),
            &user(),
            "nyancat.gif",
        ))))
        .await;
        bus.publish(RelayEvent::NotaryRequest(added(mint_request(
            relay_account(),
            &user(),
            "tacocat.gif",
        ))))
        .await;

        for _ in 0..100 {
            if orch.stats().primary == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(orch.stats().received, 2);
        assert_eq!(orch.stats().primary, 2);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
