//! Fee aggregation over wallet-controlled senders.

use super::SignableAddresses;
use crate::core::amount::Amount;
use crate::transaction::DisplayableTransaction;
use tracing::warn;

/// Total fee, in display units, of transactions the wallet would pay for.
///
/// Transactions whose sender is missing or not signable are ignored. A total
/// beyond `u64::MAX` base units is logged and capped at [`Amount::MAX`].
pub fn calculate_total_fee<'a, I>(transactions: I, signable: &SignableAddresses) -> Amount
where
    I: IntoIterator<Item = &'a DisplayableTransaction>,
{
    let total = transactions
        .into_iter()
        .filter(|txn| txn.sender.as_ref().is_some_and(|s| signable.contains(s)))
        .try_fold(Amount::ZERO, |sum, txn| sum.checked_add(Amount::from_base_units(txn.fee)));
    total.unwrap_or_else(|| {
        warn!("total fee overflows u64 base units, capping");
        Amount::MAX
    })
}
