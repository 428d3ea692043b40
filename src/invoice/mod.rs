mod aggregate;
mod assemble;
mod words;

pub use aggregate::{summarize, MilkTotals, PeriodAggregator, PeriodSummary};
pub use assemble::{money, BilledCustomer, InvoiceAssembler, InvoiceDocument, InvoiceRow, InvoiceSummary};
pub use words::{amount_in_words, title_case, to_words};
