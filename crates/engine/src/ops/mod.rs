use sea_orm::{DatabaseConnection, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, LedgerKind, LedgerTransaction, ResultEngine, ledger,
    util::normalize_required_text,
};

mod balances;
mod company;
mod statements;
mod transactions;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Loads one transaction of the `kind` ledger, failing with `KeyNotFound`.
    async fn require_transaction<C: ConnectionTrait>(
        db: &C,
        kind: LedgerKind,
        id: &str,
    ) -> ResultEngine<LedgerTransaction> {
        let model = ledger::Entity::find_by_id(id.to_string())
            .filter(ledger::Column::Ledger.eq(kind.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        LedgerTransaction::try_from(model)
    }

    /// Loads every transaction of one account, in storage order.
    async fn account_transactions<C: ConnectionTrait>(
        db: &C,
        kind: LedgerKind,
        account: &str,
    ) -> ResultEngine<Vec<LedgerTransaction>> {
        ledger::Entity::find()
            .filter(ledger::Column::Ledger.eq(kind.as_str()))
            .filter(ledger::Column::AccountName.eq(account))
            .order_by_asc(ledger::Column::Date)
            .order_by_asc(ledger::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(LedgerTransaction::try_from)
            .collect()
    }

    /// Loads every transaction of the `kind` ledger.
    async fn ledger_transactions<C: ConnectionTrait>(
        db: &C,
        kind: LedgerKind,
    ) -> ResultEngine<Vec<LedgerTransaction>> {
        ledger::Entity::find()
            .filter(ledger::Column::Ledger.eq(kind.as_str()))
            .all(db)
            .await?
            .into_iter()
            .map(LedgerTransaction::try_from)
            .collect()
    }
}

/// Normalizes a client-supplied transaction id.
fn normalize_id(value: &str) -> ResultEngine<String> {
    let id = normalize_required_text(value, "id")?;
    if id.chars().count() > 64 {
        return Err(EngineError::InvalidName(
            "id must be at most 64 characters".to_string(),
        ));
    }
    Ok(id)
}

/// Normalizes an account name used as a lookup key.
/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
