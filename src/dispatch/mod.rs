//! Signing Dispatcher - signs approved requests and resolves them
//!
//! # Architecture
//!
//! ```text
//! sign_and_send_request(request)
//!     │
//!     ├── sign_request ──▶ Signer (one future per group / item, try_join_all)
//!     │
//!     ├── chain transport ────▶ ChainClient::submit_raw_transaction (per signed group)
//!     ├── callback transport ─▶ RequestCallbacks::approve (exactly once)
//!     │
//!     └── RequestStore::remove_sign_request (on success or UnsupportedTransport)
//! ```
//!
//! Futures are joined on the calling task; nothing is spawned. The first
//! failing group or item drops the rest and its error is returned. Once
//! signing has started it cannot be cancelled from here: `reject_request`
//! only withdraws a request that is still waiting in the queue.

mod collaborators;

pub use collaborators::{signable_addresses, AccountResolver, AccountType, ChainClient, Signer, WalletAccount};

use crate::analysis::{self, RequestAnalysis, SignableAddresses};
use crate::error::{Result, SignError};
use crate::request::{ArbitraryDataItem, RequestBody, SignRequest, Signature, SignedGroup, Transport, TransportKind};
use crate::store::RequestStore;
use crate::transaction::TransactionGroup;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Output of [`SigningDispatcher::sign_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignResult {
    /// One signed group per input group, in input order.
    Transactions(Vec<SignedGroup>),
    /// One signature per item, in input order.
    ArbitraryData(Vec<Signature>),
}

impl SignResult {
    pub fn signed_groups(&self) -> Option<&[SignedGroup]> {
        match self {
            SignResult::Transactions(groups) => Some(groups),
            SignResult::ArbitraryData(_) => None,
        }
    }

    pub fn signatures(&self) -> Option<&[Signature]> {
        match self {
            SignResult::ArbitraryData(sigs) => Some(sigs),
            SignResult::Transactions(_) => None,
        }
    }
}

pub struct SigningDispatcher {
    store: Arc<RequestStore>,
    signer: Arc<dyn Signer>,
    accounts: Arc<dyn AccountResolver>,
    chain: Arc<dyn ChainClient>,
}

impl SigningDispatcher {
    pub fn new(
        store: Arc<RequestStore>,
        signer: Arc<dyn Signer>,
        accounts: Arc<dyn AccountResolver>,
        chain: Arc<dyn ChainClient>,
    ) -> Self {
        Self { store, signer, accounts, chain }
    }

    pub fn store(&self) -> &Arc<RequestStore> { &self.store }

    pub fn signable_addresses(&self) -> SignableAddresses { signable_addresses(self.accounts.as_ref()) }

    /// Facts an approval screen needs, computed against the current accounts.
    pub fn analyze(&self, request: &SignRequest) -> RequestAnalysis {
        analysis::analyze(request, &self.signable_addresses())
    }

    /// Produce signatures without resolving the request or touching the queue.
    pub async fn sign_request(&self, request: &SignRequest) -> Result<SignResult> {
        match &request.body {
            RequestBody::Transactions { groups, .. } => self.sign_groups(groups).await.map(SignResult::Transactions),
            RequestBody::ArbitraryData { items, .. } => self.sign_items(items).await.map(SignResult::ArbitraryData),
            RequestBody::Arc60 { .. } => Err(SignError::UnsupportedRequestType { kind: request.kind() }),
        }
    }

    /// Sign, resolve through the request's transport, then dequeue.
    ///
    /// The request stays queued on failure so it can be retried or rejected,
    /// except for `UnsupportedTransport`, which can never succeed.
    pub async fn sign_and_send_request(&self, request: &SignRequest) -> Result<()> {
        let outcome = self.resolve(request).await;
        match &outcome {
            Ok(()) => {
                self.store.remove_sign_request(request);
                info!(id = %request.id, kind = %request.kind(), transport = %request.transport(), "sign request resolved");
            }
            Err(e @ SignError::UnsupportedTransport { .. }) => {
                self.store.remove_sign_request(request);
                warn!(id = %request.id, error = %e, "sign request dropped");
            }
            Err(e) => warn!(id = %request.id, error = %e, reason = e.reason(), "sign request failed, left queued"),
        }
        outcome
    }

    /// Withdraw a queued request. Only callback transports have someone to notify.
    /// Returns whether the request was still queued.
    pub fn reject_request(&self, request: &SignRequest) -> bool {
        match &request.body {
            RequestBody::Transactions { transport: Transport::Callback(hooks), .. } => hooks.reject(),
            RequestBody::ArbitraryData { transport: Transport::Callback(hooks), .. } => hooks.reject(),
            RequestBody::Arc60 { callbacks } => callbacks.reject(),
            RequestBody::Transactions { transport: Transport::Chain, .. }
            | RequestBody::ArbitraryData { transport: Transport::Chain, .. } => {}
        }
        let removed = self.store.remove_sign_request(request);
        info!(id = %request.id, removed, "sign request rejected");
        removed
    }

    /// Give up on a request after a failure: notify a callback caller with
    /// `reason` and dequeue. Returns whether the request was still queued.
    pub fn fail_request(&self, request: &SignRequest, reason: &str) -> bool {
        match &request.body {
            RequestBody::Transactions { transport: Transport::Callback(hooks), .. } => hooks.error(reason),
            RequestBody::ArbitraryData { transport: Transport::Callback(hooks), .. } => hooks.error(reason),
            RequestBody::Arc60 { callbacks } => callbacks.error(reason),
            RequestBody::Transactions { transport: Transport::Chain, .. }
            | RequestBody::ArbitraryData { transport: Transport::Chain, .. } => {}
        }
        let removed = self.store.remove_sign_request(request);
        warn!(id = %request.id, reason, removed, "sign request failed and removed");
        removed
    }

    async fn resolve(&self, request: &SignRequest) -> Result<()> {
        match &request.body {
            RequestBody::Transactions { groups, transport } => {
                let signed = self.sign_groups(groups).await?;
                match transport {
                    Transport::Chain => self.submit_groups(&signed).await,
                    Transport::Callback(hooks) => {
                        hooks.approve(signed);
                        Ok(())
                    }
                }
            }
            RequestBody::ArbitraryData { items, transport } => match transport {
                Transport::Chain => Err(SignError::UnsupportedTransport {
                    kind: request.kind(),
                    transport: TransportKind::Chain,
                }),
                Transport::Callback(hooks) => {
                    let signatures = self.sign_items(items).await?;
                    hooks.approve(signatures);
                    Ok(())
                }
            },
            RequestBody::Arc60 { .. } => Err(SignError::UnsupportedRequestType { kind: request.kind() }),
        }
    }

    async fn sign_groups(&self, groups: &[TransactionGroup]) -> Result<Vec<SignedGroup>> {
        let signer = self.signer.as_ref();
        try_join_all(groups.iter().enumerate().map(|(index, group)| async move {
            let indices: Vec<usize> = (0..group.len()).collect();
            debug!(group = index, size = group.len(), "signing transaction group");
            signer.sign_transactions(group, &indices).await.map_err(SignError::Signer)
        }))
        .await
    }

    async fn sign_items(&self, items: &[ArbitraryDataItem]) -> Result<Vec<Signature>> {
        let accounts = self.accounts.as_ref();
        let signer = self.signer.as_ref();
        try_join_all(items.iter().map(|item| async move {
            let account = accounts
                .find_account(&item.signer_address)
                .ok_or_else(|| SignError::AccountNotFound { address: item.signer_address.clone() })?;
            let signatures = signer.sign_arbitrary_data(&account, &item.payload).await.map_err(SignError::Signer)?;
            signatures
                .into_iter()
                .next()
                .ok_or_else(|| SignError::SignatureGenerationFailed { address: item.signer_address.clone() })
        }))
        .await
    }

    // Each group is an independent submission; no retry here.
    async fn submit_groups(&self, signed: &[SignedGroup]) -> Result<()> {
        let chain = self.chain.as_ref();
        try_join_all(signed.iter().map(|group| async move {
            let bytes = chain.encode_signed_transactions(group);
            chain.submit_raw_transaction(&bytes).await.map_err(SignError::Submission)
        }))
        .await
        .map(|_| ())
    }
}
