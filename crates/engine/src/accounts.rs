//! Account summaries derived from ledger transactions.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    ConvertedTotal, Currency, LedgerTransaction, ResultEngine,
    balances::{checked_total, chronological},
};

/// One row of the account list view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub name: String,
    pub total_transactions: usize,
    /// Plain sum of debits, in whatever currencies the transactions use.
    pub total_debit_minor: i64,
    pub total_credit_minor: i64,
    pub current_balance_minor: i64,
    pub last_transaction_date: NaiveDate,
    /// Currency of the chronologically last transaction.
    pub currency: Currency,
}

/// Groups balance-computed transactions by account name.
///
/// Accounts without transactions cannot appear. Rows come back ordered by
/// name.
pub fn aggregate_accounts(
    transactions: &[LedgerTransaction],
) -> ResultEngine<Vec<AccountSummary>> {
    let mut groups: BTreeMap<&str, Vec<&LedgerTransaction>> = BTreeMap::new();
    for tx in transactions {
        groups.entry(tx.account_name.as_str()).or_default().push(tx);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (name, group) in groups {
        let Some(last) = group.iter().copied().max_by(|a, b| chronological(a, b)) else {
            continue;
        };
        rows.push(AccountSummary {
            name: name.to_string(),
            total_transactions: group.len(),
            total_debit_minor: checked_total(group.iter().map(|tx| tx.debit_minor))?,
            total_credit_minor: checked_total(group.iter().map(|tx| tx.credit_minor))?,
            current_balance_minor: last.balance_minor,
            last_transaction_date: last.date,
            currency: last.currency,
        });
    }
    Ok(rows)
}

/// Keeps rows whose name contains `needle`, ignoring case.
pub fn filter_by_name(rows: Vec<AccountSummary>, needle: &str) -> Vec<AccountSummary> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| row.name.to_lowercase().contains(&needle))
        .collect()
}

/// Combined current balance of `rows` converted to `display`.
///
/// Stored balances are untouched; each row is converted from its own
/// currency.
pub fn converted_total(rows: &[AccountSummary], display: Currency) -> ConvertedTotal {
    let mut total = ConvertedTotal::new(display);
    for row in rows {
        total.add(row.current_balance_minor, row.currency);
    }
    total
}
