use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::PeriodSummary;
use super::words::amount_in_words;
use crate::config::{Dairy, InvoiceSettings};
use crate::ledger::round_money;
use crate::model::{Customer, CustomerId};
use crate::period::Month;

/// One printed line of the invoice table. Numeric cells are preformatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    pub sno: usize,
    pub item: String,
    pub qty: String,
    pub rate: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Closing figures of an invoice, each with exactly two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    pub subtotal: Decimal,
    pub total: Decimal,
    pub received: Decimal,
    pub balance: Decimal,
    pub total_in_words: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BilledCustomer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
}

/// Everything a renderer needs to print a monthly invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    pub dairy: Dairy,
    pub customer: BilledCustomer,
    pub month: String,
    pub date: String,
    pub currency_symbol: String,
    pub rows: Vec<InvoiceRow>,
    pub summary: InvoiceSummary,
}

/// Two-decimal money value, e.g. `400` → `400.00`.
pub fn money(value: Decimal) -> Decimal {
    let mut value = round_money(value);
    value.rescale(2);
    value
}

pub struct InvoiceAssembler<'a> {
    dairy: &'a Dairy,
    settings: &'a InvoiceSettings,
}

impl<'a> InvoiceAssembler<'a> {
    pub fn new(dairy: &'a Dairy, settings: &'a InvoiceSettings) -> Self {
        Self { dairy, settings }
    }

    /// Table rows: one per milk type, then a single combined "Extras" row
    /// when any extras were delivered.
    pub fn rows(&self, summary: &PeriodSummary) -> Vec<InvoiceRow> {
        let mut rows = Vec::with_capacity(summary.milk.len() + 1);

        for (milk_type, totals) in &summary.milk {
            rows.push(InvoiceRow {
                sno: rows.len() + 1,
                item: format!("Milk {milk_type}"),
                qty: format!("{} LTR", money(totals.total_quantity)),
                rate: money(totals.representative_rate).to_string(),
                amount: money(totals.total_amount).to_string(),
                remarks: None,
            });
        }

        if !summary.extras.is_empty() {
            let remarks = summary
                .extras
                .iter()
                .map(|(name, amount)| {
                    format!("{} ({}{})", name, self.settings.currency_symbol, amount.normalize())
                })
                .collect::<Vec<_>>()
                .join(", ");

            rows.push(InvoiceRow {
                sno: rows.len() + 1,
                item: "Extras".to_string(),
                qty: "-".to_string(),
                rate: "-".to_string(),
                amount: money(summary.extras_total()).to_string(),
                remarks: Some(remarks),
            });
        }

        rows
    }

    pub fn summary(&self, summary: &PeriodSummary) -> InvoiceSummary {
        let total = money(summary.total_charges);
        InvoiceSummary {
            subtotal: total,
            total,
            received: money(summary.total_paid),
            balance: money(summary.period_due),
            total_in_words: amount_in_words(summary.total_charges, &self.settings.words_suffix),
        }
    }

    pub fn assemble(
        &self,
        customer: &Customer,
        month: Month,
        summary: &PeriodSummary,
        issued: NaiveDate,
    ) -> InvoiceDocument {
        InvoiceDocument {
            dairy: self.dairy.clone(),
            customer: BilledCustomer {
                id: customer.id,
                name: customer.name.clone(),
                phone: customer.phone.clone(),
            },
            month: month.to_string(),
            date: issued.format("%d/%m/%Y").to_string(),
            currency_symbol: self.settings.currency_symbol.clone(),
            rows: self.rows(summary),
            summary: self.summary(summary),
        }
    }
}
