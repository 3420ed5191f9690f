use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{Credentials, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod company;
mod documents;
mod server;
mod statements;
mod transactions;

pub mod types {
    pub mod transaction {
        pub use api_types::transaction::{
            RecomputeResponse, TransactionDelete, TransactionList, TransactionListResponse,
            TransactionNew, TransactionUpdate, TransactionView,
        };
    }

    pub mod account {
        pub use api_types::account::{
            AccountHistory, AccountHistoryQuery, AccountList, AccountListResponse, AccountNew,
            AccountSummaryView, ConvertedTotalView,
        };
    }

    pub mod company {
        pub use api_types::company::{CompanyProfileUpsert, CompanyProfileView};
    }

    pub mod document {
        pub use api_types::document::{
            DocumentKind, DocumentRequest, DocumentTotalsView, ItemLine, LineTotalsView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidCurrency(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

/// Unwraps a field that the wire type keeps optional.
fn required<T>(value: Option<T>, field: &str) -> Result<T, ServerError> {
    value.ok_or_else(|| ServerError::Generic(format!("missing field: {field}")))
}
