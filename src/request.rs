//! SignRequest - closed sum over kind × transport
//!
//! A request is created by an external origin, queued in the
//! [`RequestStore`](crate::store::RequestStore), and resolved exactly once by
//! the [`SigningDispatcher`](crate::dispatch::SigningDispatcher).
//!
//! | Kind | Chain transport | Callback transport |
//! |------|-----------------|--------------------|
//! | transactions | sign, submit each group | sign, `approve(signed_groups)` |
//! | arbitrary-data | always `UnsupportedTransport` | sign, `approve(signatures)` |
//! | arc60 | n/a | `UnsupportedRequestType` |
//!
//! Callback hooks live inside [`Transport::Callback`], so a callback request
//! without hooks cannot be constructed.

use crate::transaction::TransactionGroup;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One signed transaction blob.
pub type SignedTransaction = Vec<u8>;
/// Signed transactions of one group, in group order.
pub type SignedGroup = Vec<SignedTransaction>;
/// Raw signature bytes.
pub type Signature = Vec<u8>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    /// 128 random bits, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// An empty id means the origin did not assign one.
    pub fn is_unassigned(&self) -> bool { self.0.is_empty() }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    Transactions,
    ArbitraryData,
    Arc60,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Transactions => "transactions",
            RequestKind::ArbitraryData => "arbitrary-data",
            RequestKind::Arc60 => "arc60",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Chain,
    Callback,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Chain => "chain",
            TransportKind::Callback => "callback",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Hooks back into the requesting caller's session.
pub trait RequestCallbacks<T>: Send + Sync {
    fn approve(&self, result: T);
    fn reject(&self);
    fn error(&self, reason: &str);
}

pub type CallbackHandle<T> = Arc<dyn RequestCallbacks<T>>;

/// Where the signed result goes.
pub enum Transport<T> {
    /// Submitted straight to the network; no caller session to notify.
    Chain,
    /// Returned to the caller. Never persisted.
    Callback(CallbackHandle<T>),
}

impl<T> Transport<T> {
    pub fn callback(hooks: impl RequestCallbacks<T> + 'static) -> Self {
        Transport::Callback(Arc::new(hooks))
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::Chain => TransportKind::Chain,
            Transport::Callback(_) => TransportKind::Callback,
        }
    }
}

impl<T> Clone for Transport<T> {
    fn clone(&self) -> Self {
        match self {
            Transport::Chain => Transport::Chain,
            Transport::Callback(hooks) => Transport::Callback(hooks.clone()),
        }
    }
}

impl<T> fmt::Debug for Transport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.kind().as_str()) }
}

/// Display metadata about whoever created the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub icons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitraryDataItem {
    pub signer_address: String,
    #[serde(with = "crate::core::encoding::bytes")]
    pub payload: Vec<u8>,
    #[serde(default)]
    pub message: Option<String>,
    pub chain_id: u64,
}

#[derive(Clone)]
pub enum RequestBody {
    Transactions {
        groups: Vec<TransactionGroup>,
        transport: Transport<Vec<SignedGroup>>,
    },
    ArbitraryData {
        items: Vec<ArbitraryDataItem>,
        transport: Transport<Vec<Signature>>,
    },
    /// Reserved; dispatch always fails with `UnsupportedRequestType`.
    Arc60 { callbacks: CallbackHandle<Vec<Signature>> },
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Transactions { groups, transport } => f
                .debug_struct("Transactions")
                .field("groups", groups)
                .field("transport", transport)
                .finish(),
            RequestBody::ArbitraryData { items, transport } => f
                .debug_struct("ArbitraryData")
                .field("items", items)
                .field("transport", transport)
                .finish(),
            RequestBody::Arc60 { .. } => f.write_str("Arc60"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignRequest {
    pub id: RequestId,
    /// Correlation id of the transport session (e.g. a connect session topic).
    pub transport_id: Option<String>,
    pub origin: Option<Origin>,
    pub created_at: DateTime<Utc>,
    pub body: RequestBody,
}

impl SignRequest {
    pub fn new(body: RequestBody) -> Self {
        Self { id: RequestId::generate(), transport_id: None, origin: None, created_at: Utc::now(), body }
    }

    pub fn transactions(groups: Vec<TransactionGroup>, transport: Transport<Vec<SignedGroup>>) -> Self {
        Self::new(RequestBody::Transactions { groups, transport })
    }

    pub fn arbitrary_data(items: Vec<ArbitraryDataItem>, transport: Transport<Vec<Signature>>) -> Self {
        Self::new(RequestBody::ArbitraryData { items, transport })
    }

    pub fn arc60(callbacks: impl RequestCallbacks<Vec<Signature>> + 'static) -> Self {
        Self::new(RequestBody::Arc60 { callbacks: Arc::new(callbacks) })
    }

    pub fn with_id(mut self, id: impl Into<RequestId>) -> Self { self.id = id.into(); self }
    pub fn with_transport_id(mut self, id: impl Into<String>) -> Self { self.transport_id = Some(id.into()); self }
    pub fn with_origin(mut self, origin: Origin) -> Self { self.origin = Some(origin); self }

    pub fn kind(&self) -> RequestKind {
        match &self.body {
            RequestBody::Transactions { .. } => RequestKind::Transactions,
            RequestBody::ArbitraryData { .. } => RequestKind::ArbitraryData,
            RequestBody::Arc60 { .. } => RequestKind::Arc60,
        }
    }

    pub fn transport(&self) -> TransportKind {
        match &self.body {
            RequestBody::Transactions { transport, .. } => transport.kind(),
            RequestBody::ArbitraryData { transport, .. } => transport.kind(),
            RequestBody::Arc60 { .. } => TransportKind::Callback,
        }
    }

    /// Only chain-transport requests survive a restart.
    pub fn is_durable(&self) -> bool { self.transport() == TransportKind::Chain }

    /// Transaction groups in submission order; empty for non-transaction kinds.
    pub fn groups(&self) -> &[TransactionGroup] {
        match &self.body {
            RequestBody::Transactions { groups, .. } => groups,
            RequestBody::ArbitraryData { .. } | RequestBody::Arc60 { .. } => &[],
        }
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self { Self(value) }
}
