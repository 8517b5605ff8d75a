//! Pre-approval analysis: structure, cost and risk of a request.
//!
//! Everything here is pure and synchronous. Fee and warning computations only
//! look at transactions whose sender the wallet can sign for.

pub mod classify;
pub mod fee;
pub mod warnings;

pub use classify::{classify, group_transactions, RequestShape};
pub use fee::calculate_total_fee;
pub use warnings::{aggregate_transaction_warnings, summarize_warnings, WarningSummary};

use crate::core::amount::Amount;
use crate::request::SignRequest;
use crate::transaction::{DisplayableTransaction, TransactionWarning};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Addresses for which the wallet holds enough key material to sign.
pub type SignableAddresses = HashSet<String>;

/// Everything an approval screen shows about one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAnalysis {
    pub shape: RequestShape,
    pub group_count: usize,
    pub transaction_count: usize,
    pub total_fee: Amount,
    pub warnings: Vec<TransactionWarning>,
    pub summary: WarningSummary,
}

/// Non-transaction requests analyze as an empty `Single`.
pub fn analyze(request: &SignRequest, signable: &SignableAddresses) -> RequestAnalysis {
    analyze_groups(request.groups(), signable)
}

/// Analysis of bare transaction groups, e.g. ones read from a file.
pub fn analyze_groups(groups: &[Vec<DisplayableTransaction>], signable: &SignableAddresses) -> RequestAnalysis {
    let warnings = aggregate_transaction_warnings(groups.iter().flatten(), signable);
    RequestAnalysis {
        shape: classify(groups),
        group_count: groups.len(),
        transaction_count: groups.iter().map(Vec::len).sum(),
        total_fee: calculate_total_fee(groups.iter().flatten(), signable),
        summary: summarize_warnings(&warnings),
        warnings,
    }
}
