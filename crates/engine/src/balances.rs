//! Running balance computation.
//!
//! Transactions never point at "the previous transaction", so balances are
//! always re-derived from the complete account history: sort, then fold
//! `credit - debit` starting from zero.

use std::{cmp::Ordering, collections::BTreeMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, LedgerTransaction, ResultEngine};

/// One account's transactions in chronological order with balances assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancedHistory {
    pub transactions: Vec<LedgerTransaction>,
    /// Balance of the last transaction, 0 for an empty history.
    pub current_balance_minor: i64,
}

impl BalancedHistory {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn last(&self) -> Option<&LedgerTransaction> {
        self.transactions.last()
    }

    /// Balance immediately before the first transaction dated `from` or later.
    pub fn opening_balance(&self, from: NaiveDate) -> i64 {
        self.transactions
            .iter()
            .take_while(|tx| tx.date < from)
            .last()
            .map_or(0, |tx| tx.balance_minor)
    }
}

/// Chronological order: `date`, then `created_at`, then `id`.
///
/// `id` only matters for rows created in the same instant and keeps the order
/// total, so repeated computations assign the same balances.
pub fn chronological(a: &LedgerTransaction, b: &LedgerTransaction) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts one account's transactions and assigns each its running balance.
///
/// `balance[i] = balance[i - 1] + credit[i] - debit[i]` with a starting
/// balance of 0. A running balance outside the `i64` range is an
/// [`EngineError::InvalidAmount`].
pub fn compute_balances(
    mut transactions: Vec<LedgerTransaction>,
) -> ResultEngine<BalancedHistory> {
    transactions.sort_by(chronological);

    let mut balance = 0i64;
    for tx in &mut transactions {
        balance = balance
            .checked_add(tx.credit_minor)
            .and_then(|b| b.checked_sub(tx.debit_minor))
            .ok_or_else(|| balance_overflow(&tx.account_name))?;
        tx.balance_minor = balance;
    }

    Ok(BalancedHistory {
        transactions,
        current_balance_minor: balance,
    })
}

fn balance_overflow(account: &str) -> EngineError {
    EngineError::InvalidAmount(format!("balance of account '{account}' is out of range"))
}

/// Sums minor amounts, failing instead of wrapping.
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = i64>) -> ResultEngine<i64> {
    amounts.into_iter().try_fold(0i64, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("total is out of range".to_string()))
    })
}

/// Recomputes the balances of every account found in `transactions`.
///
/// Returns all transactions grouped by account name, each group in
/// chronological order.
pub fn balance_all(
    transactions: Vec<LedgerTransaction>,
) -> ResultEngine<Vec<LedgerTransaction>> {
    let mut by_account: BTreeMap<String, Vec<LedgerTransaction>> = BTreeMap::new();
    for tx in transactions {
        by_account
            .entry(tx.account_name.clone())
            .or_default()
            .push(tx);
    }

    let mut balanced = Vec::new();
    for history in by_account.into_values() {
        balanced.extend(compute_balances(history)?.transactions);
    }
    Ok(balanced)
}
