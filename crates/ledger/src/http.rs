use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::chain::Chain;
use crate::crypto;
use crate::error::ChainError;
use crate::types::{BookCheckout, CatalogItem};

/// Shared state for the ledger HTTP API.
#[derive(Clone)]
pub struct LedgerState {
    chain: Arc<RwLock<Chain>>,
}

/// HTTP API for reading and extending the chain.
pub struct LedgerApi {
    router: Router,
}

impl LedgerApi {
    #[must_use]
    pub fn new(chain: Arc<RwLock<Chain>>) -> Self {
        let state = LedgerState { chain };

        let router = Router::new()
            .route("/", routing::get(get_chain).post(write_block))
            .route("/new", routing::post(new_catalog_item))
            .route("/height", routing::get(get_height))
            .route("/block/{position}", routing::get(get_block))
            .route("/validate", routing::get(validate_chain))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }

    /// Run the HTTP server.
    ///
    /// # Errors
    /// Returns an error if the server fails to start.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        axum::serve(listener, self.router).await
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    fn internal(message: &str, detail: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.into(),
            message: message.to_string(),
            detail: Some(detail.to_string()),
        }
    }

    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND.into(),
            message: message.to_string(),
            detail: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(self),
        )
            .into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(value: ChainError) -> Self {
        match value {
            ChainError::Linkage(e) => Self {
                status: StatusCode::CONFLICT.into(),
                message: "block rejected".to_string(),
                detail: Some(e.to_string()),
            },
            e @ (ChainError::EmptyChain
            | ChainError::PositionOverflow(_)
            | ChainError::InvalidGenesis
            | ChainError::InvalidBlock { .. }) => Self::internal("chain is corrupt", e),
            ChainError::Serialization(s) => Self::internal("unable to serialize block", s),
        }
    }
}

/// Encode `value` as indented JSON with the given status.
fn pretty_json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_string_pretty(value).map_err(|e| {
        tracing::error!(error = %e, "unable to encode response");
        ApiError::internal("unable to encode response", e)
    })?;

    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Checkout as submitted by clients. The genesis flag is not accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutRequest {
    #[serde(alias = "book_id")]
    pub item_id: String,
    #[serde(alias = "user")]
    pub holder: String,
    pub checkout_date: String,
}

impl From<CheckoutRequest> for BookCheckout {
    fn from(value: CheckoutRequest) -> Self {
        Self::new(value.item_id, value.holder, value.checkout_date)
    }
}

/// Catalog item as submitted by clients, before an identifier is assigned.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewCatalogItem {
    #[serde(alias = "isbn")]
    pub external_code: String,
    pub title: String,
    #[serde(alias = "author")]
    pub creator: String,
    pub publish_date: String,
}

impl From<NewCatalogItem> for CatalogItem {
    fn from(value: NewCatalogItem) -> Self {
        Self {
            identifier: crypto::catalog_identifier(&value.external_code, &value.publish_date),
            external_code: value.external_code,
            title: value.title,
            creator: value.creator,
            publish_date: value.publish_date,
        }
    }
}

#[derive(Serialize)]
struct Height {
    height: u64,
}

#[derive(Serialize)]
struct Validation {
    ok: bool,
    height: u64,
    error: Option<String>,
}

/// The whole chain in order.
#[tracing::instrument(skip(state))]
#[allow(clippy::significant_drop_tightening)]
async fn get_chain(State(state): State<LedgerState>) -> Result<Response, ApiError> {
    let chain = state.chain.read().await;
    pretty_json(StatusCode::OK, chain.blocks())
}

/// Record a checkout as a new block.
#[tracing::instrument(skip(state))]
async fn write_block(
    State(state): State<LedgerState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(checkout) = payload.map_err(|e| {
        tracing::warn!(error = %e, "unable to decode checkout");
        ApiError::internal("unable to write block", e.body_text())
    })?;

    let block = state
        .chain
        .write()
        .await
        .append(checkout.into())
        .inspect_err(|e| tracing::warn!(error = %e, "checkout rejected"))?;

    tracing::info!(position = block.position, commitment = %block.commitment, "checkout recorded");
    pretty_json(StatusCode::CREATED, &block)
}

/// Assign a content-derived identifier to a catalog item.
#[tracing::instrument]
async fn new_catalog_item(
    payload: Result<Json<NewCatalogItem>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(item) = payload.map_err(|e| {
        tracing::warn!(error = %e, "unable to decode catalog item");
        ApiError::internal("unable to create catalog item", e.body_text())
    })?;

    let item = CatalogItem::from(item);
    pretty_json(StatusCode::OK, &item)
}

/// Current chain height.
#[tracing::instrument(skip(state))]
async fn get_height(State(state): State<LedgerState>) -> impl IntoResponse {
    let height = state.chain.read().await.height();
    Json(Height { height })
}

/// Look up a block by position.
#[tracing::instrument(skip(state))]
#[allow(clippy::significant_drop_tightening)]
async fn get_block(
    State(state): State<LedgerState>,
    Path(position): Path<u64>,
) -> Result<Response, ApiError> {
    let chain = state.chain.read().await;
    let block = chain
        .get_block(position)
        .ok_or_else(|| ApiError::not_found("no block at that position"))?;
    pretty_json(StatusCode::OK, block)
}

/// Re-verify every block from genesis to tip.
#[tracing::instrument(skip(state))]
#[allow(clippy::significant_drop_tightening)]
async fn validate_chain(State(state): State<LedgerState>) -> impl IntoResponse {
    let chain = state.chain.read().await;
    let error = chain.audit().err().map(|e| e.to_string());
    if let Some(e) = &error {
        tracing::error!(error = %e, "chain audit failed");
    }

    Json(Validation {
        ok: error.is_none(),
        height: chain.height(),
        error,
    })
}
