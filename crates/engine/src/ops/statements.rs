use crate::{
    DocumentTotals, EngineError, ItemDocument, LedgerKind, Report, ReportLayout, ResultEngine,
    Statement, TransactionFilter, compute_balances, normalize_account_name, render_item_document,
    render_statement,
};

use super::Engine;

impl Engine {
    /// Builds the statement of one account over the filter's date range.
    ///
    /// Balances are computed over the full history first, so rows inside the
    /// range carry their true running balance and the opening balance sums
    /// everything dated before `filter.from`.
    pub async fn statement(
        &self,
        kind: LedgerKind,
        filter: &TransactionFilter,
    ) -> ResultEngine<Statement> {
        filter.check()?;
        let account = filter
            .account
            .as_deref()
            .ok_or_else(|| EngineError::InvalidName("account name is required".to_string()))
            .and_then(normalize_account_name)?;

        let transactions = Self::account_transactions(&self.database, kind, &account).await?;
        if transactions.is_empty() {
            return Err(EngineError::KeyNotFound(account));
        }
        let history = compute_balances(transactions)?;

        let opening_balance_minor = filter
            .from
            .map_or(0, |from| history.opening_balance(from));
        let transactions = history
            .transactions
            .into_iter()
            .filter(|tx| filter.in_range(tx.date))
            .collect();

        Ok(Statement {
            ledger: kind,
            account: account.clone(),
            filter: TransactionFilter {
                account: Some(account),
                ..filter.clone()
            },
            opening_balance_minor,
            transactions,
        })
    }

    /// Renders an account statement under the stored company header.
    pub async fn render_statement(
        &self,
        kind: LedgerKind,
        filter: &TransactionFilter,
        layout: ReportLayout,
    ) -> ResultEngine<Report> {
        let statement = self.statement(kind, filter).await?;
        let profile = self.company_profile().await?.unwrap_or_default();
        let report = render_statement(&profile, &statement, layout)?;
        tracing::debug!(
            "rendered {} statement for '{}' ({} pages)",
            kind.as_str(),
            statement.account,
            report.page_count()
        );
        Ok(report)
    }

    /// Validates an item document and computes its totals.
    pub fn document_totals(&self, document: ItemDocument) -> ResultEngine<DocumentTotals> {
        document.validate()?.totals()
    }

    /// Renders an invoice, quotation or purchase order.
    pub async fn render_document(
        &self,
        document: ItemDocument,
        layout: ReportLayout,
    ) -> ResultEngine<Report> {
        let document = document.validate()?;
        let profile = self.company_profile().await?.unwrap_or_default();
        render_item_document(&profile, &document, layout)
    }
}
