//! Errors surfaced by the store and the signing dispatcher.

use crate::request::{RequestKind, TransportKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignError>;

/// Every non-success path of `sign_request` / `sign_and_send_request`.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("unsupported request type: {kind}")]
    UnsupportedRequestType { kind: RequestKind },

    #[error("{kind} signing is not supported via this transport ({transport})")]
    UnsupportedTransport { kind: RequestKind, transport: TransportKind },

    #[error("no wallet account for signer address {address}")]
    AccountNotFound { address: String },

    #[error("signer returned no signature for {address}")]
    SignatureGenerationFailed { address: String },

    #[error("signer failed: {0:#}")]
    Signer(anyhow::Error),

    #[error("transaction submission failed: {0:#}")]
    Submission(anyhow::Error),
}

impl SignError {
    /// Stable machine-readable reason, handed to `error(reason)` hooks and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            SignError::UnsupportedRequestType { .. } => "unsupported_request_type",
            SignError::UnsupportedTransport { .. } => "unsupported_transport",
            SignError::AccountNotFound { .. } => "account_not_found",
            SignError::SignatureGenerationFailed { .. } => "signature_generation_failed",
            SignError::Signer(_) => "signer_error",
            SignError::Submission(_) => "submission_error",
        }
    }
}

/// Durable storage failures. Never returned from queue mutation, only logged.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io ({key}): {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage json ({key}): {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned: {0}")]
    Poisoned(&'static str),
}
