//! Bookkeeping core: customer and supplier ledgers, running balances,
//! account summaries and printable reports.

pub use accounts::{AccountSummary, aggregate_accounts, converted_total, filter_by_name};
pub use balances::{BalancedHistory, balance_all, chronological, compute_balances};
pub use company::CompanyProfile;
pub use currency::{ConvertedTotal, Currency, convert_minor};
pub use documents::{DocumentKind, DocumentTotals, ItemDocument, ItemLine, LineTotals};
pub use error::EngineError;
pub use ledger::{
    LedgerKind, LedgerTransaction, TransactionFilter, TransactionInput, normalize_account_name,
};
pub use money::{Money, parse_minor};
pub use ops::{Engine, EngineBuilder};
pub use report::{Report, ReportLayout, Statement, render_item_document, render_statement};

mod accounts;
mod balances;
mod company;
mod currency;
mod documents;
mod error;
mod ledger;
mod money;
mod ops;
mod report;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
