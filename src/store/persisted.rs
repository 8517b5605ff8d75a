//! Durable projection of the queue.
//!
//! Only chain-transport requests have a persisted shape. Callback hooks point
//! into a caller session that dies with the process, so there is nothing to
//! write for them and nothing to restore.

use crate::core::paths::queue;
use crate::request::{ArbitraryDataItem, Origin, RequestBody, RequestId, SignRequest, Transport};
use crate::transaction::TransactionGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PersistedBody {
    Transactions { groups: Vec<TransactionGroup> },
    ArbitraryData { items: Vec<ArbitraryDataItem> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRequest {
    pub id: RequestId,
    #[serde(default)]
    pub transport_id: Option<String>,
    #[serde(default)]
    pub origin: Option<Origin>,
    pub created_at: DateTime<Utc>,
    pub body: PersistedBody,
}

impl PersistedRequest {
    /// `None` for anything that is not chain transport.
    pub fn from_request(request: &SignRequest) -> Option<Self> {
        let body = match &request.body {
            RequestBody::Transactions { groups, transport: Transport::Chain } => {
                PersistedBody::Transactions { groups: groups.clone() }
            }
            RequestBody::ArbitraryData { items, transport: Transport::Chain } => {
                PersistedBody::ArbitraryData { items: items.clone() }
            }
            RequestBody::Transactions { transport: Transport::Callback(_), .. }
            | RequestBody::ArbitraryData { transport: Transport::Callback(_), .. }
            | RequestBody::Arc60 { .. } => return None,
        };
        Some(Self {
            id: request.id.clone(),
            transport_id: request.transport_id.clone(),
            origin: request.origin.clone(),
            created_at: request.created_at,
            body,
        })
    }

    pub fn into_request(self) -> SignRequest {
        let body = match self.body {
            PersistedBody::Transactions { groups } => RequestBody::Transactions { groups, transport: Transport::Chain },
            PersistedBody::ArbitraryData { items } => RequestBody::ArbitraryData { items, transport: Transport::Chain },
        };
        SignRequest {
            id: self.id,
            transport_id: self.transport_id,
            origin: self.origin,
            created_at: self.created_at,
            body,
        }
    }
}

/// Versioned envelope written under [`queue::PENDING`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedQueue {
    pub schema: String,
    pub requests: Vec<PersistedRequest>,
}

impl PersistedQueue {
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a SignRequest>) -> Self {
        Self {
            schema: queue::SCHEMA.to_string(),
            requests: requests.into_iter().filter_map(PersistedRequest::from_request).collect(),
        }
    }
}
