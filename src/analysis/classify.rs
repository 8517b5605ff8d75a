//! Request shape and atomic grouping.

use crate::request::{RequestBody, SignRequest};
use crate::transaction::DisplayableTransaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestShape {
    Single,
    Group,
    GroupList,
}

/// Zero groups or one singleton group is `Single`, one larger group is
/// `Group`, anything with more than one group is `GroupList`.
pub fn classify<T>(groups: &[Vec<T>]) -> RequestShape {
    match groups {
        [] => RequestShape::Single,
        [only] if only.len() <= 1 => RequestShape::Single,
        [_] => RequestShape::Group,
        _ => RequestShape::GroupList,
    }
}

/// Split a flat list into atomic groups.
///
/// Transactions sharing a non-empty group id land together; groups appear in
/// the order their first member was seen. Ungrouped transactions are
/// singletons. Nothing is reordered.
pub fn group_transactions(transactions: Vec<DisplayableTransaction>) -> Vec<Vec<DisplayableTransaction>> {
    let mut groups: Vec<Vec<DisplayableTransaction>> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for txn in transactions {
        let Some(group_id) = txn.group_id().map(str::to_string) else {
            groups.push(vec![txn]);
            continue;
        };
        match index_by_id.get(&group_id) {
            Some(&i) => groups[i].push(txn),
            None => {
                index_by_id.insert(group_id, groups.len());
                groups.push(vec![txn]);
            }
        }
    }
    groups
}

impl SignRequest {
    /// Arbitrary-data and arc60 requests are always `Single`.
    pub fn shape(&self) -> RequestShape {
        match &self.body {
            RequestBody::Transactions { groups, .. } => classify(groups),
            RequestBody::ArbitraryData { .. } | RequestBody::Arc60 { .. } => RequestShape::Single,
        }
    }
}
