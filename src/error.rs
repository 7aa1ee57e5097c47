use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

// Errors surfaced by the node client, the enrichment pipeline and the HTTP API
#[derive(Debug, Error)]
pub enum ExplorerError {
    // Node unreachable or the RPC call itself failed
    #[error("RPC error: {0}")]
    Rpc(String),

    // The node did not answer within the configured bound
    #[error("RPC call timed out after {0:?}")]
    Timeout(Duration),

    // The requested entity does not exist (or is not visible yet)
    #[error("{0} not found")]
    NotFound(String),

    // A path or query parameter could not be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // The node answered with a payload we could not decode
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        ExplorerError::NotFound(what.to_string())
    }

    pub fn invalid(what: impl std::fmt::Display) -> Self {
        ExplorerError::InvalidInput(what.to_string())
    }
}

impl From<jsonrpsee::core::ClientError> for ExplorerError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        ExplorerError::Rpc(e.to_string())
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(e: serde_json::Error) -> Self {
        ExplorerError::Decode(e.to_string())
    }
}

impl From<alloy_sol_types::Error> for ExplorerError {
    fn from(e: alloy_sol_types::Error) -> Self {
        ExplorerError::Decode(e.to_string())
    }
}

// Maps the taxonomy onto HTTP: missing entities and bad input are the caller's problem,
// everything else is reported as a server failure with the underlying message
impl ResponseError for ExplorerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
            ExplorerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
