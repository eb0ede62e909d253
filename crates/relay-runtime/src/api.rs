//! # HTTP Surface
//!
//! | Route | Result |
//! |-------|--------|
//! | `GET /balance` | relay fee-asset balance as a decimal string |
//! | `GET /properties/:id` | item properties as JSON, `id` hex-encoded |
//! | `GET/POST /notary-deposit/:address` | deposit for `address`, status only |
//!
//! `address` is either the little-endian script hash hex or the base58
//! `N...` address.

use crate::adapters::PropertiesReader;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use nr_01_admission::AdmissionApi;
use shared_types::ScriptHash;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Handler state.
#[derive(Clone)]
pub struct ApiState {
    admission: Arc<dyn AdmissionApi>,
    properties: Arc<dyn PropertiesReader>,
}

impl ApiState {
    /// State serving `admission` and `properties`.
    pub fn new(admission: Arc<dyn AdmissionApi>, properties: Arc<dyn PropertiesReader>) -> Self {
        Self {
            admission,
            properties,
        }
    }
}

/// Relay HTTP router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/balance", get(balance))
        .route("/properties/:id", get(properties))
        .route("/notary-deposit/:address", get(deposit).post(deposit))
        .with_state(state)
}

async fn balance(State(state): State<ApiState>) -> Response {
    info!("[api] Balance request");
    match state.admission.balance().await {
        Ok(balance) => (StatusCode::OK, balance.to_string()).into_response(),
        Err(e) => {
            error!(error = %e, "[api] Balance query failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn properties(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    info!(%id, "[api] Properties request");
    let Ok(raw_id) = hex::decode(&id) else {
        warn!(%id, "[api] Invalid item id");
        return StatusCode::BAD_REQUEST.into_response();
    };
    let pairs = match state.properties.properties(&raw_id).await {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!(%id, error = %e, "[api] Properties call failed");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    match render_properties(pairs) {
        Ok(props) => (StatusCode::OK, Json(props)).into_response(),
        Err(reason) => {
            error!(%id, %reason, "[api] Malformed properties");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// String map of `pairs`; the `id` value is hex-encoded, everything else
/// must be UTF-8.
pub fn render_properties(
    pairs: Vec<(Vec<u8>, Vec<u8>)>,
) -> Result<BTreeMap<String, String>, String> {
    pairs
        .into_iter()
        .map(|(key, value)| {
            let key = String::from_utf8(key).map_err(|_| "non-UTF-8 key".to_string())?;
            let value = if key == "id" {
                hex::encode(value)
            } else {
                String::from_utf8(value).map_err(|_| format!("non-UTF-8 value for {key}"))?
            };
            Ok((key, value))
        })
        .collect()
}

async fn deposit(State(state): State<ApiState>, Path(address): Path<String>) -> StatusCode {
    info!(%address, "[api] Notary deposit request");
    let parsed = address
        .parse::<ScriptHash>()
        .or_else(|_| ScriptHash::from_address(&address));
    let beneficiary = match parsed {
        Ok(account) => account,
        Err(e) => {
            warn!(%address, error = %e, "[api] Invalid address");
            return StatusCode::BAD_REQUEST;
        }
    };
    match state.admission.ensure_deposit(beneficiary).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            error!(%beneficiary, error = %e, "[api] Deposit failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use nr_01_admission::{AdmissionController, DepositConfig, MockDepositLedger};
    use shared_crypto::{LocalSigner, Secp256k1KeyPair};
    use shared_types::LedgerError;
    use tower::ServiceExt;

    struct FixedProperties(Vec<(Vec<u8>, Vec<u8>)>);

    #[async_trait]
    impl PropertiesReader for FixedProperties {
        async fn properties(&self, id: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError> {
            if id == [0xAB] {
                Ok(self.0.clone())
            } else {
                Err(LedgerError::Faulted("token not found".into()))
            }
        }
    }

    fn app(ledger: MockDepositLedger, props: Vec<(Vec<u8>, Vec<u8>)>) -> Router {
        let signer = Arc::new(LocalSigner::new(
            Secp256k1KeyPair::from_bytes([1; 32]).unwrap(),
            0,
        ));
        let admission = Arc::new(AdmissionController::new(
            Arc::new(ledger),
            signer,
            DepositConfig::default(),
        ));
        router(ApiState::new(admission, Arc::new(FixedProperties(props))))
    }

    async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_balance() {
        let router = app(
            MockDepositLedger {
                balance: 1234,
                ..Default::default()
            },
            vec![],
        );
        assert_eq!(
            call(router, Method::GET, "/balance").await,
            (StatusCode::OK, "1234".to_string())
        );
    }

    #[tokio::test]
    async fn test_balance_failure_is_500() {
        let router = app(
            MockDepositLedger {
                should_fail: true,
                ..Default::default()
            },
            vec![],
        );
        let (status, _) = call(router, Method::GET, "/balance").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_properties_hex_encodes_id() {
        let router = app(
            MockDepositLedger::default(),
            vec![
                (b"id".to_vec(), vec![0xAB]),
                (b"name".to_vec(), b"nyancat.gif".to_vec()),
            ],
        );
        let (status, body) = call(router, Method::GET, "/properties/ab").await;
        assert_eq!(status, StatusCode::OK);

        let json: BTreeMap<String, String> = serde_json::from_str(&body).unwrap();
        assert_eq!(json["id"], "ab");
        assert_eq!(json["name"], "nyancat.gif");
    }

    #[tokio::test]
    async fn test_properties_errors() {
        let router = app(
            MockDepositLedger::default(),
            vec![(b"name".to_vec(), vec![0xFF, 0xFE])],
        );
        assert_eq!(
            call(router.clone(), Method::GET, "/properties/zz").await.0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            call(router.clone(), Method::GET, "/properties/cd").await.0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            call(router, Method::GET, "/properties/ab").await.0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_deposit_routes() {
        let router = app(MockDepositLedger::default(), vec![]);
        let account = ScriptHash::new([5; 20]);
        let uri = format!("/notary-deposit/{account}");

        assert_eq!(call(router.clone(), Method::POST, &uri).await.0, StatusCode::OK);
        assert_eq!(call(router.clone(), Method::GET, &uri).await.0, StatusCode::OK);
        assert_eq!(
            call(router, Method::POST, "/notary-deposit/not-an-address").await.0,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_deposit_accepts_base58_address() {
        let router = app(MockDepositLedger::default(), vec![]);
        let address = ScriptHash::new([5; 20]).to_address();
        let uri = format!("/notary-deposit/{address}");

        assert_eq!(call(router.clone(), Method::POST, &uri).await.0, StatusCode::OK);

        let swap = if address[1..].starts_with('a') { "b" } else { "a" };
        let mut corrupted = address.clone();
        corrupted.replace_range(1..2, swap);
        assert_eq!(
            call(router, Method::POST, &format!("/notary-deposit/{corrupted}")).await.0,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_deposit_failure_is_500() {
        let router = app(
            MockDepositLedger {
                fault: true,
                ..Default::default()
            },
            vec![],
        );
        let uri = format!("/notary-deposit/{}", ScriptHash::new([5; 20]));
        assert_eq!(
            call(router, Method::POST, &uri).await.0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
