// API handlers for the Entropy Node

use crate::api::AppState;
use crate::error::{NodeError, Result};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use entropy::types::rpc::{BlockhashResponse, HealthResponse};
use entropy::{Transaction, TransactionId};
use std::sync::Arc;
use tracing::{debug, info};

/// Submit transaction handler
///
/// Runs on the blocking pool: a commit may write the ledger snapshot.
pub async fn submit_transaction(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Transaction>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(transaction) = payload.map_err(|rejection| {
        debug!("Rejected transaction body: {}", rejection.body_text());
        NodeError::InvalidRequest(rejection.body_text())
    })?;

    info!(
        instruction = %transaction.instruction,
        signer = %transaction.signer,
        "Submitting transaction"
    );

    let ledger = state.ledger.clone();
    let receipt =
        tokio::task::spawn_blocking(move || ledger.process_transaction(&transaction)).await??;

    Ok((StatusCode::OK, Json(receipt)))
}

/// Receipt lookup handler
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: TransactionId = transaction_id
        .parse()
        .map_err(|e| NodeError::InvalidRequest(format!("{}", e)))?;

    match state.ledger.receipt(&id) {
        Some(receipt) => Ok((StatusCode::OK, Json(receipt))),
        None => {
            debug!("Transaction not found: {}", id);
            Err(NodeError::NotFound(format!("Transaction {} not found", id)))
        }
    }
}

/// Latest blockhash handler
pub async fn latest_blockhash(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = BlockhashResponse {
        blockhash: state.ledger.latest_blockhash(),
        slot: state.ledger.slot(),
    };
    (StatusCode::OK, Json(response))
}

/// Entropy state handler
pub async fn get_state(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    debug!("Reading entropy state");

    match state.ledger.state()? {
        Some(record) => Ok((StatusCode::OK, Json(record))),
        None => Err(NodeError::NotFound(format!(
            "No entropy state at {}",
            state.ledger.program().state_address()
        ))),
    }
}

/// Prime history handler
pub async fn get_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.ledger.history()))
}

/// Health check handler
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            slot: state.ledger.slot(),
            version: entropy::version().to_string(),
        }),
    )
}
