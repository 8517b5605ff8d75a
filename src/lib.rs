//! Beesign: sign-request orchestration for a wallet.
//!
//! Requests to authorize transactions or arbitrary data are queued durably
//! and deduplicated, analyzed for cost and risk before approval, then signed
//! and resolved by network submission or by the caller's callback.
//!
//! # Architecture
//!
//! ```text
//! origin (deeplink, connect session, dApp)
//!   │
//!   ├── RequestStore::add_sign_request      (dedupe by id, persist chain subset)
//!   │
//!   ├── analysis::analyze                   (shape, total fee, close/rekey warnings)
//!   │     └── read by the approval UI
//!   │
//!   └── SigningDispatcher
//!         ├── sign_and_send_request ──▶ Signer ──▶ ChainClient | approve()
//!         ├── reject_request        ──▶ reject()
//!         └── fail_request          ──▶ error(reason)
//!               └── RequestStore::remove_sign_request
//! ```
//!
//! # Resolution
//!
//! | Kind | Transport | On approval |
//! |------|-----------|-------------|
//! | transactions | chain | sign groups, submit each |
//! | transactions | callback | sign groups, `approve(signed_groups)` |
//! | arbitrary-data | chain | `UnsupportedTransport`, dequeued |
//! | arbitrary-data | callback | sign items, `approve(signatures)` |
//! | arc60 | callback | `UnsupportedRequestType` |
//!
//! # Features
//!
//! - `native` - file-backed storage defaults, log subscriber, CLI
//!
//! # Usage
//!
//! ```ignore
//! use beesign::{RequestStore, SignRequest, SigningDispatcher, Transport};
//!
//! let store = Arc::new(StoreConfig::new("wallet").open_store());
//! store.init()?;
//! let mut request = SignRequest::transactions(groups, Transport::Chain);
//! store.add_sign_request(&mut request);
//!
//! let dispatcher = SigningDispatcher::new(store.clone(), signer, accounts, chain);
//! let facts = dispatcher.analyze(&request);
//! dispatcher.sign_and_send_request(&request).await?;
//! ```

pub mod analysis;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod request;
pub mod session;
pub mod store;
pub mod transaction;

#[cfg(feature = "native")]
pub mod logging;

pub use analysis::{analyze, RequestAnalysis, RequestShape, SignableAddresses, WarningSummary};
pub use config::StoreConfig;
pub use crate::core::address::{decode_address, encode_address};
pub use crate::core::amount::Amount;
pub use dispatch::{AccountResolver, ChainClient, SignResult, Signer, SigningDispatcher, WalletAccount};
pub use error::{Result, SignError, StorageError};
pub use request::{
    ArbitraryDataItem, Origin, RequestBody, RequestCallbacks, RequestId, RequestKind, SignRequest, Signature,
    SignedGroup, Transport, TransportKind,
};
pub use session::Session;
pub use store::{FileStorage, KeyValueStorage, MemoryStorage, RequestStore};
pub use transaction::{DisplayableTransaction, TransactionDetails, TransactionWarning, WarningKind};
