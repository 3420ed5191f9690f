//! Printable account statements.

use api_types::report::StatementQuery;
use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use engine::{LedgerKind, ReportLayout, TransactionFilter};

use crate::{ServerError, required, server::ServerState};

pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Applies the optional overrides on top of the default page geometry.
pub(crate) fn layout_from(width: Option<usize>, page_height: Option<usize>) -> ReportLayout {
    let default = ReportLayout::default();
    ReportLayout {
        width: width.unwrap_or(default.width),
        page_height: page_height.unwrap_or(default.page_height),
    }
}

pub async fn statement(
    Extension(kind): Extension<LedgerKind>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<StatementQuery>, ServerError>,
) -> Result<impl IntoResponse, ServerError> {
    let filter = TransactionFilter {
        account: Some(required(query.account, "account")?),
        from: query.from,
        to: query.to,
    };
    let layout = layout_from(query.width, query.page_height);
    let report = state.engine.render_statement(kind, &filter, layout).await?;

    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], report.to_string()))
}
