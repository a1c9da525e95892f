// Entropy Node API Module
//
// HTTP API exposing the hosted entropy program. Clients fetch a recent
// blockhash, submit a transaction carrying an `initialize` or `prime`
// instruction, and receive a confirmation receipt once it is committed.
//
// # API Endpoints
//
// * `GET  /health`                   - liveness and current slot
// * `GET  /api/v1/blockhash`         - latest blockhash and slot
// * `POST /api/v1/transactions`      - submit a transaction, returns the receipt
// * `GET  /api/v1/transactions/:id`  - look up a committed receipt
// * `GET  /api/v1/state`             - current entropy state record
// * `GET  /api/v1/history`           - audit trail of committed primes
//
// # Error Handling
//
// Failures are returned as `{"error": {"code": ..., "message": ...}}` with the
// status code chosen by `NodeError`.
//
// ## Using the API with curl
//
// ```bash
// BH=$(curl -s http://localhost:8899/api/v1/blockhash | jq -r .blockhash)
// curl -X POST -H "Content-Type: application/json" \
//      -d "{\"instruction\":\"initialize\",\"signer\":\"me\",\"recent_blockhash\":\"$BH\"}" \
//      http://localhost:8899/api/v1/transactions
// ```

use crate::error::{NodeError, Result};
use axum::{
    routing::{get, post},
    Router,
};
use entropy::Ledger;
use std::future::Future;
use std::net::TcpListener;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;

/// Application state shared with all routes.
#[derive(Clone)]
pub struct AppState {
    /// Ledger hosting the program deployment
    pub ledger: Arc<Ledger>,
}

/// Build the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health_check))
        // Ledger endpoints
        .route("/api/v1/blockhash", get(handlers::latest_blockhash))
        .route("/api/v1/transactions", post(handlers::submit_transaction))
        .route("/api/v1/transactions/:transaction_id", get(handlers::get_transaction))
        // Program state endpoints
        .route("/api/v1/state", get(handlers::get_state))
        .route("/api/v1/history", get(handlers::get_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The HTTP server for the Entropy Node.
pub struct ApiServer {
    /// Application state shared with all request handlers
    app_state: Arc<AppState>,
    /// Server bind address in the format "IP:port"
    bind_address: String,
}

impl ApiServer {
    pub fn new(ledger: Arc<Ledger>, bind_address: String) -> Self {
        Self {
            app_state: Arc::new(AppState { ledger }),
            bind_address,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.app_state.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(&self.bind_address).map_err(|e| {
            NodeError::Config(format!("Invalid bind address {}: {}", self.bind_address, e))
        })?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!("Starting API server on {}", local_addr);

        axum::Server::from_tcp(listener)
            .map_err(|e| NodeError::Server(e.to_string()))?
            .serve(self.router().into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| NodeError::Server(e.to_string()))?;

        info!("API server on {} stopped", local_addr);
        Ok(())
    }
}
