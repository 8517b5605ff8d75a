//! Close and rekey detection.
//!
//! A close-target drains the sender's remaining balance (or asset holding) to
//! another address. A rekey-target hands signing authority to another key.
//! Both are surfaced before approval, per transaction and in input order.

use super::SignableAddresses;
use crate::core::address::encode_address;
use crate::transaction::{DisplayableTransaction, TransactionWarning, WarningKind};
use serde::{Deserialize, Serialize};

/// Every warning, in transaction order. Close precedes rekey within one
/// transaction. Not deduplicated.
pub fn aggregate_transaction_warnings<'a, I>(transactions: I, signable: &SignableAddresses) -> Vec<TransactionWarning>
where
    I: IntoIterator<Item = &'a DisplayableTransaction>,
{
    let mut warnings = Vec::new();
    for txn in transactions {
        let Some(sender) = txn.sender.as_deref() else { continue };
        if !signable.contains(sender) {
            continue;
        }
        if let Some(target) = txn.close_target() {
            warnings.push(TransactionWarning {
                kind: WarningKind::Close,
                sender_address: sender.to_string(),
                target_address: target.to_string(),
            });
        }
        if let Some(key) = &txn.rekey_to {
            warnings.push(TransactionWarning {
                kind: WarningKind::Rekey,
                sender_address: sender.to_string(),
                target_address: encode_address(key),
            });
        }
    }
    warnings
}

/// First occurrence of each warning kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSummary {
    pub close: Option<TransactionWarning>,
    pub rekey: Option<TransactionWarning>,
}

impl WarningSummary {
    pub fn is_empty(&self) -> bool { self.close.is_none() && self.rekey.is_none() }
}

pub fn summarize_warnings(warnings: &[TransactionWarning]) -> WarningSummary {
    let first = |kind: WarningKind| warnings.iter().find(|w| w.kind == kind).cloned();
    WarningSummary { close: first(WarningKind::Close), rekey: first(WarningKind::Rekey) }
}
