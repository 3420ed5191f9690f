//! Invoice, quotation and purchase-order rendering. Nothing here is stored.

use api_types::document::{
    DocumentKind as ApiKind, DocumentRequest, DocumentTotalsView, LineTotalsView,
};
use axum::{Json, extract::State, http::header, response::IntoResponse};
use axum_extra::extract::WithRejection;
use engine::{DocumentKind, ItemDocument, ItemLine};

use crate::{
    ServerError, required,
    server::ServerState,
    statements::{TEXT_PLAIN, layout_from},
    transactions::{engine_currency, map_currency},
};

fn map_kind(kind: ApiKind) -> DocumentKind {
    match kind {
        ApiKind::Invoice => DocumentKind::Invoice,
        ApiKind::Quotation => DocumentKind::Quotation,
        ApiKind::PurchaseOrder => DocumentKind::PurchaseOrder,
    }
}

fn document_from_wire(payload: DocumentRequest) -> Result<ItemDocument, ServerError> {
    Ok(ItemDocument {
        kind: map_kind(required(payload.kind, "kind")?),
        number: required(payload.number, "number")?,
        date: required(payload.date, "date")?,
        party: required(payload.party, "party")?,
        currency: engine_currency(required(payload.currency, "currency")?),
        lines: payload
            .lines
            .into_iter()
            .map(|line| ItemLine {
                description: line.description,
                quantity: line.quantity,
                unit_price_minor: line.unit_price_minor,
                vat_rate_bp: line.vat_rate_bp,
            })
            .collect(),
    })
}

pub async fn totals(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<DocumentRequest>, ServerError>,
) -> Result<Json<DocumentTotalsView>, ServerError> {
    let document = document_from_wire(payload)?;
    let currency = map_currency(document.currency);
    let totals = state.engine.document_totals(document)?;

    Ok(Json(DocumentTotalsView {
        currency,
        lines: totals
            .lines
            .into_iter()
            .map(|line| LineTotalsView {
                net_minor: line.net_minor,
                vat_minor: line.vat_minor,
                gross_minor: line.gross_minor,
            })
            .collect(),
        subtotal_minor: totals.subtotal_minor,
        vat_minor: totals.vat_minor,
        total_minor: totals.total_minor,
    }))
}

pub async fn render(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<DocumentRequest>, ServerError>,
) -> Result<impl IntoResponse, ServerError> {
    let layout = payload.layout;
    let document = document_from_wire(payload)?;
    let layout = layout_from(
        layout.map(|layout| layout.width),
        layout.map(|layout| layout.page_height),
    );
    let report = state.engine.render_document(document, layout).await?;
    tracing::debug!("rendered document ({} pages)", report.page_count());

    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], report.to_string()))
}
