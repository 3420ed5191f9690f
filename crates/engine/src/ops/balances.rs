use std::collections::HashMap;

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{LedgerKind, LedgerTransaction, ResultEngine, balance_all, compute_balances, ledger};

use super::{Engine, with_tx};

impl Engine {
    /// Recomputes the stored balances of every account of a ledger from the
    /// full transaction history.
    ///
    /// Returns how many rows had a stale balance.
    pub async fn recompute_balances(&self, kind: LedgerKind) -> ResultEngine<usize> {
        with_tx!(self, |db_tx| {
            let transactions = Self::ledger_transactions(&db_tx, kind).await?;
            let changed = persist_balances(&db_tx, transactions, balance_all).await?;
            if changed > 0 {
                tracing::info!("rewrote {changed} stale {} balances", kind.as_str());
            }
            Ok(changed)
        })
    }

    /// Recomputes and stores the balances of a single account.
    pub(super) async fn rebalance_account<C: ConnectionTrait>(
        db: &C,
        kind: LedgerKind,
        account: &str,
    ) -> ResultEngine<usize> {
        let transactions = Self::account_transactions(db, kind, account).await?;
        persist_balances(db, transactions, |txs| {
            compute_balances(txs).map(|history| history.transactions)
        })
        .await
    }
}

/// Runs `recompute` and writes back every balance that changed.
async fn persist_balances<C, F>(
    db: &C,
    transactions: Vec<LedgerTransaction>,
    recompute: F,
) -> ResultEngine<usize>
where
    C: ConnectionTrait,
    F: FnOnce(Vec<LedgerTransaction>) -> ResultEngine<Vec<LedgerTransaction>>,
{
    let stored: HashMap<String, i64> = transactions
        .iter()
        .map(|tx| (tx.id.clone(), tx.balance_minor))
        .collect();

    let mut changed = 0;
    for tx in recompute(transactions)? {
        if stored.get(&tx.id) == Some(&tx.balance_minor) {
            continue;
        }
        let model = ledger::ActiveModel {
            id: ActiveValue::Set(tx.id.clone()),
            balance_minor: ActiveValue::Set(tx.balance_minor),
            ..Default::default()
        };
        model.update(db).await?;
        changed += 1;
    }
    Ok(changed)
}
