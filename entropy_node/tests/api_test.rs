// Router-level tests for the Entropy Node API
//
// Requests go straight into the axum router with `oneshot`; no socket is
// bound.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use entropy::types::rpc::{BlockhashResponse, ErrorResponse, HealthResponse};
use entropy::{id, EntropyProgram, EntropyState, Instruction, Ledger, PrimeRecord, Receipt, Transaction};
use entropy_node::{create_router, AppState};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, Arc<Ledger>) {
    let ledger = Arc::new(Ledger::new(EntropyProgram::new(id())));
    let router = create_router(Arc::new(AppState {
        ledger: ledger.clone(),
    }));
    (router, ledger)
}

async fn call<T: DeserializeOwned>(router: &Router, request: Request<Body>) -> (StatusCode, T) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_transaction(tx: &Transaction) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/transactions")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(tx).unwrap()))
        .unwrap()
}

async fn submit(router: &Router, instruction: Instruction) -> (StatusCode, serde_json::Value) {
    let (_, info): (_, BlockhashResponse) = call(router, get("/api/v1/blockhash")).await;
    let tx = Transaction::new(instruction, "api-test", info.blockhash);
    call(router, post_transaction(&tx)).await
}

#[tokio::test]
async fn test_health() {
    let (router, _) = app();
    let (status, health): (_, HealthResponse) = call(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, "ok");
    assert_eq!(health.slot, 0);
}

#[tokio::test]
async fn test_initialize_and_prime_over_http() {
    let (router, ledger) = app();

    let (status, body) = submit(&router, Instruction::Initialize).await;
    assert_eq!(status, StatusCode::OK);
    let init: Receipt = serde_json::from_value(body).unwrap();
    assert_eq!(init.generation, 0);

    let (status, state): (_, EntropyState) = call(&router, get("/api/v1/state")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, EntropyState::new());

    let (status, body) = submit(&router, Instruction::Prime).await;
    assert_eq!(status, StatusCode::OK);
    let prime: Receipt = serde_json::from_value(body).unwrap();
    assert_eq!(prime.generation, 1);

    let uri = format!("/api/v1/transactions/{}", prime.transaction_id);
    let (status, found): (_, Receipt) = call(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, prime);

    let (_, history): (_, Vec<PrimeRecord>) = call(&router, get("/api/v1/history")).await;
    assert_eq!(history, ledger.history());
    assert!(entropy::verify_history(&history));
}

#[tokio::test]
async fn test_program_errors_are_reported() {
    let (router, _) = app();

    let (status, body) = submit(&router, Instruction::Prime).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(err.error.code, "NOT_INITIALIZED");

    let (status, err): (_, ErrorResponse) = call(&router, get("/api/v1/state")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.code, "NOT_FOUND");

    submit(&router, Instruction::Initialize).await;
    let (status, body) = submit(&router, Instruction::Initialize).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(err.error.code, "ALREADY_INITIALIZED");
}

#[tokio::test]
async fn test_unknown_blockhash_rejected() {
    let (router, _) = app();
    let tx = Transaction::new(
        Instruction::Initialize,
        "api-test",
        entropy::Blockhash::new([0xee; 32]),
    );

    let (status, err): (_, ErrorResponse) = call(&router, post_transaction(&tx)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error.code, "BLOCKHASH_NOT_FOUND");
}

#[tokio::test]
async fn test_receipt_lookup_errors() {
    let (router, _) = app();

    let (status, err): (_, ErrorResponse) =
        call(&router, get("/api/v1/transactions/not-a-hash")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error.code, "INVALID_REQUEST");

    let missing = format!("/api/v1/transactions/{}", "00".repeat(32));
    let (status, err): (_, ErrorResponse) = call(&router, get(&missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.code, "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_body_gets_error_envelope() {
    let (router, ledger) = app();

    for body in [
        "{not json",
        r#"{"instruction":"prime"}"#,
        r#"{"instruction":"rewind","signer":"x","recent_blockhash":"00"}"#,
    ] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/transactions")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let (status, err): (_, ErrorResponse) = call(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(err.error.code, "INVALID_REQUEST");
    }
    assert_eq!(ledger.slot(), 0);
}

#[tokio::test]
async fn test_finalize_over_http() {
    let ledger = Arc::new(Ledger::new(
        EntropyProgram::new(id()).with_delay_iterations(64),
    ));
    let router = create_router(Arc::new(AppState {
        ledger: ledger.clone(),
    }));

    submit(&router, Instruction::Initialize).await;
    submit(&router, Instruction::Prime).await;

    let (status, body) = submit(&router, Instruction::Finalize).await;
    assert_eq!(status, StatusCode::OK);
    let receipt: Receipt = serde_json::from_value(body).unwrap();
    assert_eq!(receipt.generation, 1);

    let (_, state): (_, EntropyState) = call(&router, get("/api/v1/state")).await;
    let outcome = state.outcome.expect("outcome after finalize");
    assert!(entropy::verify_outcome(&outcome, &ledger.history()[0].seed));

    let (status, body) = submit(&router, Instruction::Finalize).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(err.error.code, "ALREADY_FINALIZED");
}
