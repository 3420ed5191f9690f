//! Account list, account opening and per-account history.

use api_types::account::{
    AccountHistory, AccountHistoryQuery, AccountList, AccountListResponse, AccountNew,
    AccountSummaryView, ConvertedTotalView,
};
use api_types::transaction::TransactionView;
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{
    AccountSummary, LedgerKind, converted_total, filter_by_name, normalize_account_name,
};

use crate::{
    ServerError, required,
    server::ServerState,
    transactions::{engine_currency, map_currency, map_transaction},
};

fn map_summary(summary: AccountSummary) -> AccountSummaryView {
    AccountSummaryView {
        currency: map_currency(summary.currency),
        name: summary.name,
        total_transactions: summary.total_transactions,
        total_debit_minor: summary.total_debit_minor,
        total_credit_minor: summary.total_credit_minor,
        current_balance_minor: summary.current_balance_minor,
        last_transaction_date: summary.last_transaction_date,
    }
}

pub async fn list(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<AccountList>, ServerError>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let mut rows = state.engine.list_accounts(kind).await?;
    if let Some(name) = query.name.as_deref() {
        rows = filter_by_name(rows, name);
    }

    let total = query.display_currency.map(|display| {
        let total = converted_total(&rows, engine_currency(display));
        ConvertedTotalView {
            currency: map_currency(total.currency),
            amount_minor: total.amount_minor,
        }
    });

    Ok(Json(AccountListResponse {
        accounts: rows.into_iter().map(map_summary).collect(),
        total,
    }))
}

pub async fn open(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountNew>, ServerError>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let name = required(payload.name, "name")?;
    let currency = engine_currency(required(payload.currency, "currency")?);
    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());

    let seed = state
        .engine
        .open_account(kind, &name, currency, date)
        .await?;
    tracing::info!("{} account '{}' opened", kind.as_str(), seed.account_name);

    Ok((StatusCode::CREATED, Json(map_transaction(seed))))
}

pub async fn history(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<AccountHistoryQuery>, ServerError>,
) -> Result<Json<AccountHistory>, ServerError> {
    let account = normalize_account_name(&required(query.account, "account")?)?;
    let history = state.engine.account_history(kind, &account).await?;

    Ok(Json(AccountHistory {
        account,
        current_balance_minor: history.current_balance_minor,
        transactions: history
            .transactions
            .into_iter()
            .map(map_transaction)
            .collect(),
    }))
}
