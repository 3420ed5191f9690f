//! Ledger transaction endpoints, shared by the customer and supplier ledgers.

use api_types::transaction::{
    RecomputeResponse, TransactionDelete, TransactionList, TransactionListResponse,
    TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{LedgerKind, LedgerTransaction, TransactionFilter, TransactionInput};

use crate::{ServerError, required, server::ServerState};

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Pkr => api_types::Currency::Pkr,
        engine::Currency::Sar => api_types::Currency::Sar,
    }
}

pub(crate) fn engine_currency(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Pkr => engine::Currency::Pkr,
        api_types::Currency::Sar => engine::Currency::Sar,
    }
}

pub(crate) fn map_transaction(tx: LedgerTransaction) -> TransactionView {
    TransactionView {
        currency: map_currency(tx.currency),
        id: tx.id,
        account_name: tx.account_name,
        description: tx.description,
        date: tx.date,
        debit_minor: tx.debit_minor,
        credit_minor: tx.credit_minor,
        balance_minor: tx.balance_minor,
        created_at: tx.created_at,
    }
}

/// Turns the optional wire fields into an engine input, naming the first
/// missing one. Absent debit or credit counts as zero.
fn input_from_wire(
    account_name: Option<String>,
    description: Option<String>,
    date: Option<chrono::NaiveDate>,
    currency: Option<api_types::Currency>,
    debit_minor: Option<i64>,
    credit_minor: Option<i64>,
) -> Result<TransactionInput, ServerError> {
    Ok(TransactionInput {
        account_name: required(account_name, "account_name")?,
        description: required(description, "description")?,
        date: required(date, "date")?,
        currency: engine_currency(required(currency, "currency")?),
        debit_minor: debit_minor.unwrap_or(0),
        credit_minor: credit_minor.unwrap_or(0),
    })
}

pub async fn list(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<TransactionList>, ServerError>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionFilter {
        account: query.account,
        from: query.from,
        to: query.to,
    };
    let transactions = state
        .engine
        .list_transactions(kind, &filter)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn create(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionNew>, ServerError>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let input = input_from_wire(
        payload.account_name,
        payload.description,
        payload.date,
        payload.currency,
        payload.debit_minor,
        payload.credit_minor,
    )?;
    let tx = state
        .engine
        .create_transaction(kind, input, payload.id.as_deref())
        .await?;
    tracing::info!("{} transaction {} created", kind.as_str(), tx.id);

    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

pub async fn update(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionUpdate>, ServerError>,
) -> Result<Json<TransactionView>, ServerError> {
    let id = required(payload.id, "id")?;
    let input = input_from_wire(
        payload.account_name,
        payload.description,
        payload.date,
        payload.currency,
        payload.debit_minor,
        payload.credit_minor,
    )?;
    let tx = state.engine.update_transaction(kind, &id, input).await?;

    Ok(Json(map_transaction(tx)))
}

pub async fn delete(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<TransactionDelete>, ServerError>,
) -> Result<Json<TransactionView>, ServerError> {
    let id = required(query.id, "id")?;
    let tx = state.engine.delete_transaction(kind, &id).await?;
    tracing::info!("{} transaction {} deleted", kind.as_str(), tx.id);

    Ok(Json(map_transaction(tx)))
}

pub async fn recompute(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
) -> Result<Json<RecomputeResponse>, ServerError> {
    let changed = state.engine.recompute_balances(kind).await?;
    Ok(Json(RecomputeResponse { changed }))
}
