use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AccountSummary, BalancedHistory, Currency, EngineError, LedgerKind, LedgerTransaction,
    ResultEngine, TransactionFilter, TransactionInput, aggregate_accounts, balance_all,
    compute_balances, ledger, normalize_account_name,
};

use super::{Engine, normalize_id, with_tx};

/// Description given to the zero-amount transaction that opens an account.
const OPENING_DESCRIPTION: &str = "Account opened";

impl Engine {
    /// Records a new debit/credit movement.
    ///
    /// `id` is the client-generated identifier; a UUID v4 is assigned when it
    /// is `None`. The stored balances of the whole account are recomputed in
    /// the same DB transaction, so the returned row carries its final balance.
    pub async fn create_transaction(
        &self,
        kind: LedgerKind,
        input: TransactionInput,
        id: Option<&str>,
    ) -> ResultEngine<LedgerTransaction> {
        let input = input.validate()?;
        let id = match id {
            Some(id) => normalize_id(id)?,
            None => Uuid::new_v4().to_string(),
        };
        with_tx!(self, |db_tx| {
            Self::insert_transaction(&db_tx, kind, input, id).await
        })
    }

    /// Creates an account by recording a zero-amount seed transaction.
    ///
    /// Fails with `ExistingKey` when the account already has transactions.
    /// The check and the insert share one DB transaction.
    pub async fn open_account(
        &self,
        kind: LedgerKind,
        name: &str,
        currency: Currency,
        date: NaiveDate,
    ) -> ResultEngine<LedgerTransaction> {
        let input = TransactionInput {
            account_name: name.to_string(),
            description: OPENING_DESCRIPTION.to_string(),
            date,
            currency,
            debit_minor: 0,
            credit_minor: 0,
        }
        .normalized()?;

        with_tx!(self, |db_tx| {
            let existing = ledger::Entity::find()
                .filter(ledger::Column::Ledger.eq(kind.as_str()))
                .filter(ledger::Column::AccountName.eq(input.account_name.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(input.account_name));
            }

            Self::insert_transaction(&db_tx, kind, input, Uuid::new_v4().to_string()).await
        })
    }

    async fn insert_transaction<C: ConnectionTrait>(
        db: &C,
        kind: LedgerKind,
        input: TransactionInput,
        id: String,
    ) -> ResultEngine<LedgerTransaction> {
        if ledger::Entity::find_by_id(id.clone())
            .one(db)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(id));
        }

        let tx = LedgerTransaction {
            id,
            ledger: kind,
            account_name: input.account_name,
            description: input.description,
            date: input.date,
            currency: input.currency,
            debit_minor: input.debit_minor,
            credit_minor: input.credit_minor,
            balance_minor: 0,
            created_at: Utc::now(),
        };
        ledger::ActiveModel::from(&tx).insert(db).await?;
        Self::rebalance_account(db, kind, &tx.account_name).await?;

        tracing::debug!(
            "created {} transaction {} for '{}'",
            kind.as_str(),
            tx.id,
            tx.account_name
        );
        Self::require_transaction(db, kind, &tx.id).await
    }

    /// Replaces every mutable field of an existing transaction.
    ///
    /// `created_at` is preserved. Changing the account name is allowed; both
    /// the old and the new account are rebalanced.
    pub async fn update_transaction(
        &self,
        kind: LedgerKind,
        id: &str,
        input: TransactionInput,
    ) -> ResultEngine<LedgerTransaction> {
        let input = input.validate()?;
        with_tx!(self, |db_tx| {
            let existing = Self::require_transaction(&db_tx, kind, id).await?;

            let model = ledger::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                account_name: ActiveValue::Set(input.account_name.clone()),
                description: ActiveValue::Set(input.description),
                date: ActiveValue::Set(input.date),
                currency: ActiveValue::Set(input.currency.code().to_string()),
                debit_minor: ActiveValue::Set(input.debit_minor),
                credit_minor: ActiveValue::Set(input.credit_minor),
                ..Default::default()
            };
            model.update(&db_tx).await?;

            Self::rebalance_account(&db_tx, kind, &input.account_name).await?;
            if existing.account_name != input.account_name {
                tracing::info!(
                    "transaction {} moved from '{}' to '{}'",
                    existing.id,
                    existing.account_name,
                    input.account_name
                );
                Self::rebalance_account(&db_tx, kind, &existing.account_name).await?;
            }

            Self::require_transaction(&db_tx, kind, &existing.id).await
        })
    }

    /// Deletes a transaction and rebalances what is left of its account.
    ///
    /// Returns the removed row. Deleting the last transaction of an account
    /// removes the account.
    pub async fn delete_transaction(
        &self,
        kind: LedgerKind,
        id: &str,
    ) -> ResultEngine<LedgerTransaction> {
        with_tx!(self, |db_tx| {
            let existing = Self::require_transaction(&db_tx, kind, id).await?;
            ledger::Entity::delete_by_id(existing.id.clone())
                .exec(&db_tx)
                .await?;
            Self::rebalance_account(&db_tx, kind, &existing.account_name).await?;
            tracing::debug!("deleted {} transaction {}", kind.as_str(), existing.id);
            Ok(existing)
        })
    }

    /// Returns one transaction.
    pub async fn transaction(&self, kind: LedgerKind, id: &str) -> ResultEngine<LedgerTransaction> {
        Self::require_transaction(&self.database, kind, id).await
    }

    /// Lists transactions newest first (by creation time).
    pub async fn list_transactions(
        &self,
        kind: LedgerKind,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<LedgerTransaction>> {
        filter.check()?;

        let mut query = ledger::Entity::find().filter(ledger::Column::Ledger.eq(kind.as_str()));
        if let Some(account) = filter.account.as_deref() {
            query = query.filter(ledger::Column::AccountName.eq(normalize_account_name(account)?));
        }
        if let Some(from) = filter.from {
            query = query.filter(ledger::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(ledger::Column::Date.lte(to));
        }

        query
            .order_by_desc(ledger::Column::CreatedAt)
            .order_by_desc(ledger::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(LedgerTransaction::try_from)
            .collect()
    }

    /// Full chronological history of one account with balances re-derived
    /// from scratch.
    pub async fn account_history(
        &self,
        kind: LedgerKind,
        account: &str,
    ) -> ResultEngine<BalancedHistory> {
        let account = normalize_account_name(account)?;
        let transactions = Self::account_transactions(&self.database, kind, &account).await?;
        compute_balances(transactions)
    }

    /// One summary row per account of the ledger.
    ///
    /// Balances of every account are recomputed before aggregating, so the
    /// rows never depend on what is stored in `balance_minor`.
    pub async fn list_accounts(&self, kind: LedgerKind) -> ResultEngine<Vec<AccountSummary>> {
        let transactions = Self::ledger_transactions(&self.database, kind).await?;
        aggregate_accounts(&balance_all(transactions)?)
    }
}
