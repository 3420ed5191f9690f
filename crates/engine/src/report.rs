//! Printable, paginated plain-text reports.
//!
//! Every page has the same height so the output can be sent to a printer as
//! is. Each page starts with the company header, tables repeat their column
//! header after a page break, long descriptions wrap onto extra lines, and
//! the last line of each page is a `Page i of n` footer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    CompanyProfile, Currency, EngineError, ItemDocument, LedgerKind, LedgerTransaction, Money,
    ResultEngine, TransactionFilter, balances::checked_total,
};

/// Page geometry, in characters and lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLayout {
    pub width: usize,
    pub page_height: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            width: 96,
            page_height: 60,
        }
    }
}

const MIN_WIDTH: usize = 72;
const MAX_WIDTH: usize = 500;
const MAX_PAGE_HEIGHT: usize = 1_000;
const FOOTER_LINES: usize = 2;
const PAGE_BREAK: &str = "\u{c}";

impl ReportLayout {
    /// Bounds that hold whatever is printed on the page.
    fn check_size(&self) -> ResultEngine<()> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.width) {
            return Err(EngineError::InvalidDocument(format!(
                "page width must be between {MIN_WIDTH} and {MAX_WIDTH} characters"
            )));
        }
        if self.page_height > MAX_PAGE_HEIGHT {
            return Err(EngineError::InvalidDocument(format!(
                "page height must be at most {MAX_PAGE_HEIGHT} lines"
            )));
        }
        Ok(())
    }

    /// A page must fit its fixed header lines, the footer and one body line.
    fn check_height(&self, fixed_lines: usize) -> ResultEngine<()> {
        if self.page_height < fixed_lines + FOOTER_LINES + 1 {
            return Err(EngineError::InvalidDocument(format!(
                "page height must be at least {} lines",
                fixed_lines + FOOTER_LINES + 1
            )));
        }
        Ok(())
    }
}

/// A rendered document split into pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub pages: Vec<String>,
}

impl Report {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, page) in self.pages.iter().enumerate() {
            if idx > 0 {
                f.write_str(PAGE_BREAK)?;
            }
            f.write_str(page)?;
        }
        Ok(())
    }
}

/// Input of an account statement.
///
/// `transactions` are already balance-computed over the full history and then
/// narrowed to `filter`, so `opening_balance_minor` carries what came before.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub ledger: LedgerKind,
    pub account: String,
    pub filter: TransactionFilter,
    pub opening_balance_minor: i64,
    pub transactions: Vec<LedgerTransaction>,
}

impl Statement {
    pub fn total_debit_minor(&self) -> ResultEngine<i64> {
        checked_total(self.transactions.iter().map(|tx| tx.debit_minor))
    }

    pub fn total_credit_minor(&self) -> ResultEngine<i64> {
        checked_total(self.transactions.iter().map(|tx| tx.credit_minor))
    }

    pub fn final_balance_minor(&self) -> i64 {
        self.transactions
            .last()
            .map_or(self.opening_balance_minor, |tx| tx.balance_minor)
    }

    /// Currency used for the summary block: the one of the last transaction.
    pub fn currency(&self) -> Currency {
        self.transactions
            .last()
            .map(|tx| tx.currency)
            .unwrap_or_default()
    }
}

pub fn render_statement(
    profile: &CompanyProfile,
    statement: &Statement,
    layout: ReportLayout,
) -> ResultEngine<Report> {
    layout.check_size()?;
    let title = format!("{} LEDGER STATEMENT", statement.ledger.label().to_uppercase());
    let header = page_header(profile, &title, layout.width);
    let table = Table::new(
        vec![
            Column::left("Date", 10),
            Column::left("Description", 0),
            Column::left("Cur", 3),
            Column::right("Debit", 14),
            Column::right("Credit", 14),
            Column::right("Balance", 15),
        ],
        1,
        layout.width,
    );
    layout.check_height(header.len() + table.header_lines().len())?;

    let currency = statement.currency();
    let total_debit_minor = statement.total_debit_minor()?;
    let total_credit_minor = statement.total_credit_minor()?;
    let mut intro = vec![format!("Account: {}", statement.account)];
    intro.push(match (statement.filter.from, statement.filter.to) {
        (None, None) => "Period: all transactions".to_string(),
        (Some(from), None) => format!("Period: from {from}"),
        (None, Some(to)) => format!("Period: up to {to}"),
        (Some(from), Some(to)) => format!("Period: {from} to {to}"),
    });
    if statement.filter.from.is_some() {
        intro.push(format!(
            "Opening balance: {}",
            Money::new(statement.opening_balance_minor, currency)
        ));
    }
    intro.push(String::new());

    let mut pages = Paginator::new(layout, header, table.header_lines());
    pages.push_block(intro);
    pages.begin_table();
    if statement.transactions.is_empty() {
        pages.push_row(vec!["No transactions in this period.".to_string()]);
    }
    for tx in &statement.transactions {
        pages.push_row(table.row_lines(&[
            tx.date.to_string(),
            tx.description.clone(),
            tx.currency.code().to_string(),
            amount_cell(tx.debit_minor, tx.currency),
            amount_cell(tx.credit_minor, tx.currency),
            Money::new(tx.balance_minor, tx.currency).amount(),
        ]));
    }
    pages.end_table();

    pages.push_block(summary_block(
        layout.width,
        &[
            ("Total debit", Money::new(total_debit_minor, currency)),
            ("Total credit", Money::new(total_credit_minor, currency)),
            (
                "Final balance",
                Money::new(statement.final_balance_minor(), currency),
            ),
        ],
    ));

    Ok(pages.finish())
}

pub fn render_item_document(
    profile: &CompanyProfile,
    document: &ItemDocument,
    layout: ReportLayout,
) -> ResultEngine<Report> {
    layout.check_size()?;
    let totals = document.totals()?;
    let header = page_header(profile, document.kind.title(), layout.width);
    let table = Table::new(
        vec![
            Column::right("#", 3),
            Column::left("Description", 0),
            Column::right("Qty", 6),
            Column::right("Unit price", 14),
            Column::right("VAT %", 6),
            Column::right("Amount", 15),
        ],
        1,
        layout.width,
    );
    layout.check_height(header.len() + table.header_lines().len())?;

    let currency = document.currency;
    let intro = vec![
        format!("Number: {}", document.number),
        format!("Date: {}", document.date),
        format!("{}: {}", document.kind.party_label(), document.party),
        format!("Currency: {currency}"),
        String::new(),
    ];

    let mut pages = Paginator::new(layout, header, table.header_lines());
    pages.push_block(intro);
    pages.begin_table();
    for (idx, (line, line_totals)) in document.lines.iter().zip(&totals.lines).enumerate() {
        pages.push_row(table.row_lines(&[
            (idx + 1).to_string(),
            line.description.clone(),
            line.quantity.to_string(),
            Money::new(line.unit_price_minor, currency).amount(),
            format_rate(line.vat_rate_bp),
            Money::new(line_totals.net_minor, currency).amount(),
        ]));
    }
    pages.end_table();

    pages.push_block(summary_block(
        layout.width,
        &[
            ("Subtotal", Money::new(totals.subtotal_minor, currency)),
            ("VAT", Money::new(totals.vat_minor, currency)),
            (
                document.kind.total_label(),
                Money::new(totals.total_minor, currency),
            ),
        ],
    ));

    Ok(pages.finish())
}

fn amount_cell(minor: i64, currency: Currency) -> String {
    if minor == 0 {
        String::new()
    } else {
        Money::new(minor, currency).amount()
    }
}

fn format_rate(bp: u32) -> String {
    if bp % 100 == 0 {
        format!("{}", bp / 100)
    } else {
        format!("{}.{:02}", bp / 100, bp % 100)
    }
}

fn page_header(profile: &CompanyProfile, title: &str, width: usize) -> Vec<String> {
    let name = profile.name.as_str();
    let gap = width.saturating_sub(char_len(name) + char_len(title)).max(1);
    let mut lines = vec![format!("{name}{}{title}", " ".repeat(gap))];
    lines.extend(
        profile
            .contact_lines()
            .into_iter()
            .map(|line| truncate(&line, width)),
    );
    lines.push("=".repeat(width));
    lines
}

fn summary_block(width: usize, entries: &[(&str, Money)]) -> Vec<String> {
    let mut lines = vec!["-".repeat(width)];
    for (label, money) in entries {
        let value = money.to_string();
        let gap = width.saturating_sub(char_len(label) + 1 + char_len(&value)).max(1);
        lines.push(format!("{label}:{}{value}", " ".repeat(gap)));
    }
    lines
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

impl Column {
    fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Left,
        }
    }

    fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Right,
        }
    }
}

/// Fixed-width table whose `wrap` column takes the remaining width and wraps.
struct Table {
    columns: Vec<Column>,
    wrap: usize,
    width: usize,
}

impl Table {
    fn new(mut columns: Vec<Column>, wrap: usize, width: usize) -> Self {
        let fixed: usize = columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != wrap)
            .map(|(_, column)| column.width)
            .sum();
        let separators = columns.len().saturating_sub(1);
        columns[wrap].width = width.saturating_sub(fixed + separators).max(8);
        Self {
            columns,
            wrap,
            width,
        }
    }

    fn header_lines(&self) -> Vec<String> {
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.to_string()).collect();
        vec![self.render_cells(&headers), "-".repeat(self.width)]
    }

    /// Lines of one row: the wrapped column spills onto continuation lines.
    fn row_lines(&self, cells: &[String]) -> Vec<String> {
        let wrap_width = self.columns[self.wrap].width;
        let wrapped = wrap_text(cells.get(self.wrap).map_or("", String::as_str), wrap_width);

        let mut lines = Vec::with_capacity(wrapped.len());
        for (idx, fragment) in wrapped.into_iter().enumerate() {
            let row: Vec<String> = (0..self.columns.len())
                .map(|col| {
                    if col == self.wrap {
                        fragment.clone()
                    } else if idx == 0 {
                        cells.get(col).cloned().unwrap_or_default()
                    } else {
                        String::new()
                    }
                })
                .collect();
            lines.push(self.render_cells(&row));
        }
        lines
    }

    fn render_cells(&self, cells: &[String]) -> String {
        self.columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| {
                let text = truncate(cell, column.width);
                let pad = column.width.saturating_sub(char_len(&text));
                match column.align {
                    Align::Left => format!("{text}{}", " ".repeat(pad)),
                    Align::Right => format!("{}{text}", " ".repeat(pad)),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    }
}

/// Collects lines into fixed-height pages.
struct Paginator {
    layout: ReportLayout,
    page_header: Vec<String>,
    table_header: Vec<String>,
    in_table: bool,
    pages: Vec<Vec<String>>,
    current: Vec<String>,
    /// Length of `current` right after its repeated headers.
    fixed_len: usize,
}

impl Paginator {
    fn new(layout: ReportLayout, page_header: Vec<String>, table_header: Vec<String>) -> Self {
        let current = page_header.clone();
        let fixed_len = current.len();
        Self {
            layout,
            page_header,
            table_header,
            in_table: false,
            pages: Vec::new(),
            current,
            fixed_len,
        }
    }

    fn capacity(&self) -> usize {
        self.layout.page_height - FOOTER_LINES
    }

    fn fits(&self, lines: usize) -> bool {
        self.current.len() + lines <= self.capacity()
    }

    fn new_page(&mut self) {
        let finished = std::mem::replace(&mut self.current, self.page_header.clone());
        self.pages.push(finished);
        if self.in_table {
            self.current.extend(self.table_header.iter().cloned());
        }
        self.fixed_len = self.current.len();
    }

    /// Breaks the page when `lines` does not fit, unless the page is still
    /// empty, so an oversized block is placed instead of looping forever.
    fn make_room(&mut self, lines: usize) {
        if !self.fits(lines) && self.current.len() > self.fixed_len {
            self.new_page();
        }
    }

    fn push_block(&mut self, lines: Vec<String>) {
        self.make_room(lines.len());
        self.push_clipped(lines);
    }

    fn begin_table(&mut self) {
        // Keep the column header together with at least one row.
        self.make_room(self.table_header.len() + 1);
        self.current.extend(self.table_header.iter().cloned());
        self.in_table = true;
    }

    fn push_row(&mut self, lines: Vec<String>) {
        self.make_room(lines.len());
        self.push_clipped(lines);
    }

    fn end_table(&mut self) {
        self.in_table = false;
    }

    /// Appends lines, continuing on new pages when a single block is taller
    /// than a page.
    fn push_clipped(&mut self, lines: Vec<String>) {
        for line in lines {
            if !self.fits(1) {
                self.new_page();
            }
            self.current.push(line);
        }
    }

    fn finish(mut self) -> Report {
        let last = std::mem::take(&mut self.current);
        self.pages.push(last);

        let total = self.pages.len();
        let capacity = self.capacity();
        let width = self.layout.width;
        let pages = self
            .pages
            .into_iter()
            .enumerate()
            .map(|(idx, mut lines)| {
                lines.resize(capacity, String::new());
                lines.push(String::new());
                let footer = format!("Page {} of {total}", idx + 1);
                let indent = width.saturating_sub(char_len(&footer)) / 2;
                lines.push(format!("{}{footer}", " ".repeat(indent)));
                let mut page = lines.join("\n");
                page.push('\n');
                page
            })
            .collect();

        Report { pages }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn truncate(text: &str, width: usize) -> String {
    if char_len(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current.is_empty() {
            word.len()
        } else {
            char_len(&current) + 1 + word.len()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::{DocumentKind, ItemLine, compute_balances};

    fn profile() -> CompanyProfile {
        CompanyProfile {
            name: "Zaid Traders".to_string(),
            phone: Some("+92 300 0000000".to_string()),
            email: Some("accounts@zaid.example".to_string()),
            address: Some("Shop 4, Main Bazaar\nLahore".to_string()),
        }
    }

    fn tx(idx: u32, description: &str, debit: i64, credit: i64) -> LedgerTransaction {
        LedgerTransaction {
            id: format!("tx-{idx:03}"),
            ledger: LedgerKind::Customer,
            account_name: "Acme".to_string(),
            description: description.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(idx.into()),
            currency: Currency::Usd,
            debit_minor: debit,
            credit_minor: credit,
            balance_minor: 0,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn statement(transactions: Vec<LedgerTransaction>) -> Statement {
        Statement {
            ledger: LedgerKind::Customer,
            account: "Acme".to_string(),
            filter: TransactionFilter::for_account("Acme"),
            opening_balance_minor: 0,
            transactions: compute_balances(transactions).unwrap().transactions,
        }
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("alpha beta gamma delta", 11),
            vec!["alpha beta", "gamma delta"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn single_page_statement_has_summary() {
        let report = render_statement(
            &profile(),
            &statement(vec![
                tx(0, "Opening order", 0, 10_000),
                tx(1, "Payment", 3_000, 0),
            ]),
            ReportLayout::default(),
        )
        .unwrap();

        assert_eq!(report.page_count(), 1);
        let page = &report.pages[0];
        assert!(page.contains("CUSTOMER LEDGER STATEMENT"));
        assert!(page.contains("Account: Acme"));
        assert!(page.contains("Total debit:"));
        assert!(page.contains("Final balance:"));
        assert!(page.contains("70.00 USD"));
        assert!(page.contains("Page 1 of 1"));
        assert_eq!(page.lines().count(), ReportLayout::default().page_height);
    }

    #[test]
    fn long_statement_repeats_column_header() {
        let transactions = (0..80).map(|i| tx(i, "Goods delivered", 0, 100)).collect();
        let layout = ReportLayout {
            width: 80,
            page_height: 30,
        };
        let report = render_statement(&profile(), &statement(transactions), layout).unwrap();

        assert!(report.page_count() > 1);
        let mut rows = 0;
        for page in &report.pages {
            let page_rows = page.lines().filter(|l| l.starts_with("2024-")).count();
            if page_rows > 0 {
                assert!(page.contains("Date       Description"));
            }
            rows += page_rows;
            assert!(page.contains("Zaid Traders"));
            assert_eq!(page.lines().count(), layout.page_height);
        }
        assert_eq!(rows, 80);
        let last = report.pages.last().unwrap();
        assert!(last.contains(&format!("Page {n} of {n}", n = report.page_count())));
        assert!(report.to_string().contains('\u{c}'));
    }

    #[test]
    fn wrapped_description_shifts_following_rows() {
        let long = "Bulk delivery of assorted hardware including hinges, screws, \
                    brackets and a long list of fasteners for the new warehouse";
        let report = render_statement(
            &profile(),
            &statement(vec![tx(0, long, 0, 500), tx(1, "Short", 100, 0)]),
            ReportLayout {
                width: 72,
                page_height: 60,
            },
        )
        .unwrap();

        let page = &report.pages[0];
        let first = page.lines().position(|l| l.starts_with("2024-01-01")).unwrap();
        let second = page.lines().position(|l| l.starts_with("2024-01-02")).unwrap();
        assert!(second - first > 1);
    }

    #[test]
    fn rejects_tiny_layout() {
        let result = render_statement(
            &profile(),
            &statement(Vec::new()),
            ReportLayout {
                width: 20,
                page_height: 60,
            },
        );
        assert!(matches!(result, Err(EngineError::InvalidDocument(_))));
    }

    #[test]
    fn rejects_oversized_layout() {
        let transactions = vec![tx(0, "Opening order", 0, 10_000)];
        for layout in [
            ReportLayout {
                width: usize::MAX,
                page_height: 60,
            },
            ReportLayout {
                width: 96,
                page_height: usize::MAX,
            },
        ] {
            let result = render_statement(&profile(), &statement(transactions.clone()), layout);
            assert!(matches!(result, Err(EngineError::InvalidDocument(_))));
        }

        let widest = ReportLayout {
            width: 500,
            page_height: 1_000,
        };
        let report = render_statement(&profile(), &statement(transactions), widest).unwrap();
        assert_eq!(report.pages[0].lines().count(), 1_000);
    }

    #[test]
    fn statement_totals_fail_instead_of_wrapping() {
        let transactions = vec![tx(0, "Big", 0, i64::MAX), tx(1, "Bigger", 0, 1)];
        let statement = Statement {
            ledger: LedgerKind::Customer,
            account: "Acme".to_string(),
            filter: TransactionFilter::for_account("Acme"),
            opening_balance_minor: 0,
            transactions,
        };
        assert!(statement.total_credit_minor().is_err());
        let result = render_statement(&profile(), &statement, ReportLayout::default());
        assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn invoice_shows_vat_totals() {
        let document = ItemDocument {
            kind: DocumentKind::Invoice,
            number: "INV-7".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            party: "Acme".to_string(),
            currency: Currency::Sar,
            lines: vec![ItemLine {
                description: "Consulting".to_string(),
                quantity: 2,
                unit_price_minor: 10_000,
                vat_rate_bp: 1500,
            }],
        };
        let report = render_item_document(&profile(), &document, ReportLayout::default()).unwrap();
        let page = &report.pages[0];
        assert!(page.contains("INVOICE"));
        assert!(page.contains("Bill to: Acme"));
        assert!(page.contains("Subtotal:"));
        assert!(page.contains("230.00 SAR"));
    }
}
