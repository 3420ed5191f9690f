//! Item-line documents: invoices, quotations and purchase orders.
//!
//! These are only rendered, never stored. The engine owns their arithmetic so
//! every printed total is computed the same way.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine, util::normalize_required_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Quotation,
    PurchaseOrder,
}

impl DocumentKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::Quotation => "QUOTATION",
            Self::PurchaseOrder => "PURCHASE ORDER",
        }
    }

    /// Label of the counterparty block.
    pub fn party_label(self) -> &'static str {
        match self {
            Self::Invoice | Self::Quotation => "Bill to",
            Self::PurchaseOrder => "Supplier",
        }
    }

    /// Label of the final amount in the summary block.
    pub fn total_label(self) -> &'static str {
        match self {
            Self::Invoice => "Total due",
            Self::Quotation => "Quoted total",
            Self::PurchaseOrder => "Order total",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price_minor: i64,
    /// VAT rate in basis points (`1700` = 17%).
    #[serde(default)]
    pub vat_rate_bp: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    pub net_minor: i64,
    pub vat_minor: i64,
    pub gross_minor: i64,
}

impl ItemLine {
    /// `net = quantity * unit_price`, `vat = net * rate` rounded half up.
    pub fn totals(&self) -> ResultEngine<LineTotals> {
        let overflow = || EngineError::InvalidDocument("line amount too large".to_string());
        let net_minor = self
            .unit_price_minor
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(overflow)?;
        let scaled = i128::from(net_minor) * i128::from(self.vat_rate_bp);
        let vat_minor = i64::try_from((scaled + 5_000) / 10_000).map_err(|_| overflow())?;
        let gross_minor = net_minor.checked_add(vat_minor).ok_or_else(overflow)?;
        Ok(LineTotals {
            net_minor,
            vat_minor,
            gross_minor,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDocument {
    pub kind: DocumentKind,
    pub number: String,
    pub date: NaiveDate,
    pub party: String,
    pub currency: Currency,
    pub lines: Vec<ItemLine>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub lines: Vec<LineTotals>,
    pub subtotal_minor: i64,
    pub vat_minor: i64,
    pub total_minor: i64,
}

impl ItemDocument {
    pub fn validate(self) -> ResultEngine<Self> {
        if self.lines.is_empty() {
            return Err(EngineError::InvalidDocument(
                "document needs at least one line".to_string(),
            ));
        }
        let mut lines = Vec::with_capacity(self.lines.len());
        for (idx, line) in self.lines.into_iter().enumerate() {
            let position = idx + 1;
            if line.quantity == 0 {
                return Err(EngineError::InvalidDocument(format!(
                    "line {position}: quantity must be greater than zero"
                )));
            }
            if line.unit_price_minor < 0 {
                return Err(EngineError::InvalidDocument(format!(
                    "line {position}: unit price must not be negative"
                )));
            }
            if line.vat_rate_bp > 10_000 {
                return Err(EngineError::InvalidDocument(format!(
                    "line {position}: VAT rate above 100%"
                )));
            }
            lines.push(ItemLine {
                description: normalize_required_text(&line.description, "line description")?,
                ..line
            });
        }

        Ok(Self {
            number: normalize_required_text(&self.number, "document number")?,
            party: normalize_required_text(&self.party, "party")?,
            lines,
            ..self
        })
    }

    pub fn totals(&self) -> ResultEngine<DocumentTotals> {
        let overflow = || EngineError::InvalidDocument("document total too large".to_string());
        let mut totals = DocumentTotals::default();
        for line in &self.lines {
            let line_totals = line.totals()?;
            totals.subtotal_minor = totals
                .subtotal_minor
                .checked_add(line_totals.net_minor)
                .ok_or_else(overflow)?;
            totals.vat_minor = totals
                .vat_minor
                .checked_add(line_totals.vat_minor)
                .ok_or_else(overflow)?;
            totals.lines.push(line_totals);
        }
        totals.total_minor = totals
            .subtotal_minor
            .checked_add(totals.vat_minor)
            .ok_or_else(overflow)?;
        Ok(totals)
    }
}
