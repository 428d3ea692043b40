use serde::Serialize;
use std::io;

use crate::error::Result;
use crate::invoice::PeriodSummary;
use crate::model::Customer;
use crate::period::Month;

/// A bill reminder ready to be sent to one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub phone: String,
    pub message: String,
}

impl Reminder {
    pub fn new(customer: &Customer, month: Month, summary: &PeriodSummary, base_url: &str) -> Self {
        let message = format!(
            "Namaste {}, aapka {} bill {} Rs. Due: {}. Invoice: {}/api/admin/invoice/{}?month={}",
            customer.name,
            month,
            summary.total_charges.normalize(),
            summary.period_due.normalize(),
            base_url.trim_end_matches('/'),
            customer.id,
            month,
        );
        Self {
            phone: customer.phone.clone(),
            message,
        }
    }
}

/// Write reminders as headerless `phone,message` CSV rows.
pub fn write_csv<W: io::Write>(reminders: &[Reminder], out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    for reminder in reminders {
        writer.serialize(reminder)?;
    }
    writer.flush()?;
    Ok(())
}
