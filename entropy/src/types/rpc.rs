//! Wire types shared by the node's HTTP API and its clients.

use crate::types::instruction::Blockhash;
use serde::{Deserialize, Serialize};

/// Body of `GET /api/v1/blockhash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockhashResponse {
    pub blockhash: Blockhash,
    pub slot: u64,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub slot: u64,
    pub version: String,
}

/// Error envelope returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `ALREADY_INITIALIZED`
    pub code: String,
    pub message: String,
}
