use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Pkr,
    Sar,
}

pub mod transaction {
    use super::*;

    /// Request body for `POST /api/{ledger}-transactions`.
    ///
    /// Every field is optional on the wire so a missing one is reported by
    /// name instead of as a generic deserialization failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Client-generated id. The server assigns a UUID when absent.
        pub id: Option<String>,
        pub account_name: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub currency: Option<Currency>,
        pub debit_minor: Option<i64>,
        pub credit_minor: Option<i64>,
    }

    /// Request body for `PUT /api/{ledger}-transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub id: Option<String>,
        pub account_name: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub currency: Option<Currency>,
        pub debit_minor: Option<i64>,
        pub credit_minor: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account: Option<String>,
        /// Inclusive lower bound on the transaction date.
        pub from: Option<NaiveDate>,
        /// Inclusive upper bound on the transaction date.
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionDelete {
        pub id: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: String,
        pub account_name: String,
        pub description: String,
        pub date: NaiveDate,
        pub currency: Currency,
        pub debit_minor: i64,
        pub credit_minor: i64,
        pub balance_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecomputeResponse {
        /// Rows whose stored balance was stale and got rewritten.
        pub changed: usize,
    }
}

pub mod account {
    use super::*;
    use crate::transaction::TransactionView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountList {
        /// Case-insensitive substring filter on the account name.
        pub name: Option<String>,
        /// When set, the response carries the combined balance converted to
        /// this currency.
        pub display_currency: Option<Currency>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AccountSummaryView {
        pub name: String,
        pub total_transactions: usize,
        pub total_debit_minor: i64,
        pub total_credit_minor: i64,
        pub current_balance_minor: i64,
        pub last_transaction_date: NaiveDate,
        pub currency: Currency,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ConvertedTotalView {
        pub currency: Currency,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountSummaryView>,
        pub total: Option<ConvertedTotalView>,
    }

    /// Request body for `POST /api/{ledger}-accounts`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: Option<String>,
        pub currency: Option<Currency>,
        /// Opening date; today when absent.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountHistoryQuery {
        pub account: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountHistory {
        pub account: String,
        /// Oldest first, each row carrying its recomputed running balance.
        pub transactions: Vec<TransactionView>,
        pub current_balance_minor: i64,
    }
}

pub mod report {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReportLayout {
        pub width: usize,
        pub page_height: usize,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatementQuery {
        pub account: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub width: Option<usize>,
        pub page_height: Option<usize>,
    }
}

pub mod company {
    use super::*;

    /// Request body for `POST`/`PUT /api/company-profile`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CompanyProfileUpsert {
        pub name: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CompanyProfileView {
        pub name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
    }
}

pub mod document {
    use super::*;
    use crate::report::ReportLayout;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DocumentKind {
        Invoice,
        Quotation,
        PurchaseOrder,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ItemLine {
        pub description: String,
        pub quantity: u32,
        pub unit_price_minor: i64,
        /// VAT rate in basis points (`1700` = 17%).
        #[serde(default)]
        pub vat_rate_bp: u32,
    }

    /// Request body of the document endpoints. Documents are never stored.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DocumentRequest {
        pub kind: Option<DocumentKind>,
        pub number: Option<String>,
        pub date: Option<NaiveDate>,
        pub party: Option<String>,
        pub currency: Option<Currency>,
        #[serde(default)]
        pub lines: Vec<ItemLine>,
        pub layout: Option<ReportLayout>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LineTotalsView {
        pub net_minor: i64,
        pub vat_minor: i64,
        pub gross_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DocumentTotalsView {
        pub currency: Currency,
        pub lines: Vec<LineTotalsView>,
        pub subtotal_minor: i64,
        pub vat_minor: i64,
        pub total_minor: i64,
    }
}
