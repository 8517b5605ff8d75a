//! Normalized transaction projection consumed by analysis and signing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction type-specific fields that matter for risk analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransactionDetails {
    Payment {
        receiver: Option<String>,
        #[serde(default)]
        amount: u64,
        /// Drains the sender's remaining balance to this address.
        close_remainder_to: Option<String>,
    },
    AssetTransfer {
        asset_id: u64,
        receiver: Option<String>,
        #[serde(default)]
        amount: u64,
        /// Drains the sender's holding of the asset to this address.
        close_to: Option<String>,
    },
    #[default]
    Other,
}

/// One raw transaction as the approval layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayableTransaction {
    #[serde(default)]
    pub sender: Option<String>,
    /// Smallest currency unit.
    #[serde(default)]
    pub fee: u64,
    /// Atomic group identifier (base64 on the wire).
    #[serde(default)]
    pub group: Option<String>,
    /// Raw public key the sender's authority moves to.
    #[serde(default, with = "crate::core::encoding::key_opt", skip_serializing_if = "Option::is_none")]
    pub rekey_to: Option<[u8; 32]>,
    #[serde(default)]
    pub details: TransactionDetails,
    /// Unsigned encoded transaction handed to the signer.
    #[serde(default, with = "crate::core::encoding::bytes")]
    pub encoded: Vec<u8>,
}

impl DisplayableTransaction {
    pub fn new(sender: impl Into<String>, fee: u64) -> Self {
        Self { sender: Some(sender.into()), fee, ..Default::default() }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self { self.group = Some(group.into()); self }
    pub fn with_rekey_to(mut self, key: [u8; 32]) -> Self { self.rekey_to = Some(key); self }
    pub fn with_details(mut self, details: TransactionDetails) -> Self { self.details = details; self }
    pub fn with_encoded(mut self, encoded: Vec<u8>) -> Self { self.encoded = encoded; self }

    /// Group id if present and non-empty.
    pub fn group_id(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    /// Payment close-remainder or asset close-to target, whichever the type
    /// carries. An empty target is no target.
    pub fn close_target(&self) -> Option<&str> {
        let target = match &self.details {
            TransactionDetails::Payment { close_remainder_to, .. } => close_remainder_to.as_deref(),
            TransactionDetails::AssetTransfer { close_to, .. } => close_to.as_deref(),
            TransactionDetails::Other => None,
        };
        target.filter(|t| !t.is_empty())
    }
}

/// Ordered transactions meant to execute atomically.
pub type TransactionGroup = Vec<DisplayableTransaction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Close,
    Rekey,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Close => "close",
            WarningKind::Rekey => "rekey",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWarning {
    pub kind: WarningKind,
    pub sender_address: String,
    pub target_address: String,
}
