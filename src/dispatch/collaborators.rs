//! Interfaces of the collaborators the dispatcher drives.
//!
//! Implementations live outside this crate (key storage, signing primitives,
//! network client). Errors cross these seams as `anyhow::Error` and are
//! wrapped into [`SignError`](crate::error::SignError) by the dispatcher.

use crate::analysis::SignableAddresses;
use crate::request::{Signature, SignedGroup};
use crate::transaction::DisplayableTransaction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountType {
    #[default]
    Standard,
    Ledger,
    Rekeyed,
    WatchOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
    pub can_sign: bool,
    #[serde(default)]
    pub account_type: AccountType,
}

impl WalletAccount {
    pub fn signing(address: impl Into<String>) -> Self {
        Self { address: address.into(), can_sign: true, account_type: AccountType::Standard }
    }

    pub fn watch_only(address: impl Into<String>) -> Self {
        Self { address: address.into(), can_sign: false, account_type: AccountType::WatchOnly }
    }
}

#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign the transactions of one atomic group at `indices`.
    async fn sign_transactions(&self, group: &[DisplayableTransaction], indices: &[usize]) -> anyhow::Result<SignedGroup>;

    /// Sign an arbitrary payload with `account`'s key. An empty result means no signature was produced.
    async fn sign_arbitrary_data(&self, account: &WalletAccount, payload: &[u8]) -> anyhow::Result<Vec<Signature>>;
}

pub trait AccountResolver: Send + Sync {
    fn all_accounts(&self) -> Vec<WalletAccount>;

    fn find_account(&self, address: &str) -> Option<WalletAccount> {
        self.all_accounts().into_iter().find(|a| a.address == address)
    }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn submit_raw_transaction(&self, bytes: &[u8]) -> anyhow::Result<()>;

    /// Group submission encoding: signed transactions concatenated in order.
    fn encode_signed_transactions(&self, group: &SignedGroup) -> Vec<u8> {
        group.concat()
    }
}

/// Addresses the wallet can currently sign for.
pub fn signable_addresses(resolver: &dyn AccountResolver) -> SignableAddresses {
    resolver.all_accounts().into_iter().filter(|a| a.can_sign).map(|a| a.address).collect()
}
