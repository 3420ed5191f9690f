//! Ledger transaction primitives.
//!
//! A `LedgerTransaction` is a single debit or credit movement against an
//! account of the customer or the supplier ledger. Accounts have no table of
//! their own: an account exists while at least one transaction carries its
//! name.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine, util::normalize_required_text};

/// Which ledger a transaction belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Customer,
    Supplier,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
        }
    }

    /// Human label used in report titles.
    pub fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Supplier => "Supplier",
        }
    }
}

impl TryFrom<&str> for LedgerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "customer" => Ok(Self::Customer),
            "supplier" => Ok(Self::Supplier),
            other => Err(EngineError::InvalidName(format!("invalid ledger: {other}"))),
        }
    }
}

/// A debit/credit movement with its stored running balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    pub ledger: LedgerKind,
    pub account_name: String,
    pub description: String,
    pub date: NaiveDate,
    pub currency: Currency,
    pub debit_minor: i64,
    pub credit_minor: i64,
    /// Account balance right after this transaction, in its own currency.
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Seed transactions carry no amount and only bring an account to life.
    pub fn is_seed(&self) -> bool {
        self.debit_minor == 0 && self.credit_minor == 0
    }
}

/// Fields a client provides when creating or replacing a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    pub account_name: String,
    pub description: String,
    pub date: NaiveDate,
    pub currency: Currency,
    pub debit_minor: i64,
    pub credit_minor: i64,
}

impl TransactionInput {
    /// Normalizes text fields and checks the amounts.
    ///
    /// Both amounts must be non-negative and at least one must be positive.
    /// A transaction with both a debit and a credit is accepted.
    pub fn validate(self) -> ResultEngine<Self> {
        let input = self.normalized()?;
        if input.debit_minor == 0 && input.credit_minor == 0 {
            return Err(EngineError::InvalidAmount(
                "either debit or credit must be greater than zero".to_string(),
            ));
        }
        Ok(input)
    }

    /// Same as [`validate`](Self::validate) without the non-zero rule, used for
    /// account seed transactions.
    pub(crate) fn normalized(self) -> ResultEngine<Self> {
        let account_name = normalize_account_name(&self.account_name)?;
        let description = normalize_required_text(&self.description, "description")?;
        if self.debit_minor < 0 || self.credit_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "debit and credit must not be negative".to_string(),
            ));
        }
        Ok(Self {
            account_name,
            description,
            ..self
        })
    }
}

/// Canonical spelling of an account name: trimmed and NFC-normalized.
///
/// Accounts are matched on this spelling, so two inputs that only differ in
/// surrounding spaces or Unicode composition name the same account.
pub fn normalize_account_name(name: &str) -> ResultEngine<String> {
    normalize_required_text(name, "account name")
}

/// Read filter shared by listings and statements.
///
/// Date bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub account: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn for_account(account: &str) -> Self {
        Self {
            account: Some(account.to_string()),
            ..Self::default()
        }
    }

    pub fn check(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(EngineError::InvalidDate(format!(
                "from ({from}) is after to ({to})"
            )));
        }
        Ok(())
    }

    pub fn in_range(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    pub fn matches(&self, tx: &LedgerTransaction) -> bool {
        let account_ok = self
            .account
            .as_deref()
            .is_none_or(|account| tx.account_name == account);
        account_ok && self.in_range(tx.date)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub ledger: String,
    pub account_name: String,
    pub description: String,
    pub date: Date,
    pub currency: String,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerTransaction> for ActiveModel {
    fn from(tx: &LedgerTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.clone()),
            ledger: ActiveValue::Set(tx.ledger.as_str().to_string()),
            account_name: ActiveValue::Set(tx.account_name.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            date: ActiveValue::Set(tx.date),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            debit_minor: ActiveValue::Set(tx.debit_minor),
            credit_minor: ActiveValue::Set(tx.credit_minor),
            balance_minor: ActiveValue::Set(tx.balance_minor),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            ledger: LedgerKind::try_from(model.ledger.as_str())?,
            currency: Currency::try_from(model.currency.as_str())?,
            id: model.id,
            account_name: model.account_name,
            description: model.description,
            date: model.date,
            debit_minor: model.debit_minor,
            credit_minor: model.credit_minor,
            balance_minor: model.balance_minor,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(debit_minor: i64, credit_minor: i64) -> TransactionInput {
        TransactionInput {
            account_name: "  Acme ".to_string(),
            description: "Goods".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            currency: Currency::Usd,
            debit_minor,
            credit_minor,
        }
    }

    #[test]
    fn validate_rejects_zero_amounts() {
        assert!(matches!(
            input(0, 0).validate(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn validate_rejects_negative_amounts() {
        assert!(input(-1, 10).validate().is_err());
        assert!(input(10, -1).validate().is_err());
    }

    #[test]
    fn validate_accepts_debit_and_credit_together() {
        let validated = input(10, 20).validate().unwrap();
        assert_eq!(validated.account_name, "Acme");
    }

    #[test]
    fn validate_requires_text_fields() {
        let mut missing = input(0, 10);
        missing.description = "   ".to_string();
        assert!(matches!(
            missing.validate(),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[test]
    fn filter_range_is_inclusive() {
        let filter = TransactionFilter {
            account: None,
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        assert!(filter.in_range(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(filter.in_range(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!filter.in_range(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }

    #[test]
    fn filter_rejects_inverted_range() {
        let filter = TransactionFilter {
            account: None,
            from: NaiveDate::from_ymd_opt(2024, 2, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 1),
        };
        assert!(matches!(filter.check(), Err(EngineError::InvalidDate(_))));
    }
}
