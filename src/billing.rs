use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Config, Dairy, InvoiceSettings, NotifySettings};
use crate::error::{DairyError, Result};
use crate::invoice::{summarize, InvoiceAssembler, InvoiceDocument, PeriodAggregator};
use crate::ledger::{entry_total, DueLedger};
use crate::model::{
    Customer, CustomerId, Entry, EntryId, NewCustomer, NewEntry, NewPayment, Payment, PaymentId,
};
use crate::notify::Reminder;
use crate::period::Month;
use crate::store::RecordStore;

const SEARCH_LIMIT: usize = 50;

/// A stored delivery and the customer's balance right after it was charged.
#[derive(Debug, Clone)]
pub struct RecordedEntry {
    pub entry: Entry,
    pub due: Decimal,
}

#[derive(Debug, Clone)]
pub struct RecordedPayment {
    pub payment: Payment,
    pub due: Decimal,
}

/// Raw records of one month with their period totals.
#[derive(Debug, Clone)]
pub struct MonthStatement {
    pub month: Month,
    pub entries: Vec<Entry>,
    pub payments: Vec<Payment>,
    pub total_charges: Decimal,
    pub total_paid: Decimal,
    pub period_due: Decimal,
}

/// Customer-facing operations over a record store.
pub struct Billing<S: RecordStore> {
    store: S,
    dairy: Dairy,
    invoice: InvoiceSettings,
    notify: NotifySettings,
}

impl<S: RecordStore> Billing<S> {
    pub fn new(store: S, dairy: Dairy, invoice: InvoiceSettings, notify: NotifySettings) -> Self {
        Self {
            store,
            dairy,
            invoice,
            notify,
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(
            store,
            config.dairy.clone(),
            config.invoice.clone(),
            config.notify.clone(),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> DueLedger<'_, S> {
        DueLedger::new(&self.store)
    }

    pub fn register_customer(&self, new: NewCustomer) -> Result<Customer> {
        let name = new.name.trim();
        let phone = new.phone.trim();
        if name.is_empty() {
            return Err(DairyError::MissingName);
        }
        if phone.is_empty() {
            return Err(DairyError::MissingPhone);
        }
        let opening = new.opening_due.unwrap_or(Decimal::ZERO);
        if opening < Decimal::ZERO {
            return Err(DairyError::invalid_amount(opening, "opening due cannot be negative"));
        }

        let mut customer = Customer {
            id: CustomerId::new(),
            name: name.to_string(),
            phone: phone.to_string(),
            created_at: Utc::now(),
            due: Decimal::ZERO,
        };
        self.store.insert_customer(customer.clone())?;
        info!(customer = %customer.id, phone = %customer.phone, "customer registered");

        if opening > Decimal::ZERO {
            customer.due = self.ledger().apply_charge(customer.id, opening)?;
        }
        Ok(customer)
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer> {
        self.store
            .customer(id)?
            .ok_or_else(|| DairyError::CustomerNotFound(id.to_string()))
    }

    /// Look a customer up by id or by phone number.
    pub fn resolve_customer(&self, reference: &str) -> Result<Customer> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<CustomerId>() {
            if let Some(customer) = self.store.customer(id)? {
                return Ok(customer);
            }
        }
        self.store
            .customers()?
            .into_iter()
            .find(|c| c.phone == reference)
            .ok_or_else(|| DairyError::CustomerNotFound(reference.to_string()))
    }

    /// Case-insensitive match on name or phone, sorted by name.
    pub fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        let needle = query.trim().to_lowercase();
        let mut found: Vec<Customer> = self
            .store
            .customers()?
            .into_iter()
            .filter(|c| {
                needle.is_empty()
                    || c.name.to_lowercase().contains(&needle)
                    || c.phone.to_lowercase().contains(&needle)
            })
            .collect();
        found.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        found.truncate(SEARCH_LIMIT);
        Ok(found)
    }

    /// Store a delivery and charge its total to the customer. If the charge
    /// cannot be applied the entry is withdrawn again.
    pub fn record_entry(&self, customer: CustomerId, new: NewEntry) -> Result<RecordedEntry> {
        new.validate()?;
        let total = entry_total(&new.milk, &new.extras)?;
        self.customer(customer)?;

        let entry = Entry {
            id: EntryId(Uuid::new_v4()),
            customer_id: customer,
            date: new.date,
            total,
            milk: new.milk,
            extras: new.extras,
            created_at: Utc::now(),
        };
        self.store.insert_entry(entry.clone())?;

        match self.ledger().apply_charge(customer, entry.total) {
            Ok(due) => {
                info!(%customer, entry = %entry.id.0, total = %entry.total, %due, "entry recorded");
                Ok(RecordedEntry { entry, due })
            }
            Err(e) => {
                warn!(%customer, error = %e, "charge failed, withdrawing entry");
                if let Err(undo) = self.store.remove_entry(entry.id) {
                    warn!(%customer, error = %undo, "could not withdraw entry");
                }
                Err(e)
            }
        }
    }

    /// Store a payment and deduct it from the customer's balance. If the
    /// deduction cannot be applied the payment is withdrawn again.
    pub fn record_payment(&self, customer: CustomerId, new: NewPayment) -> Result<RecordedPayment> {
        if new.amount <= Decimal::ZERO {
            return Err(DairyError::NonPositivePayment);
        }
        self.customer(customer)?;

        let payment = Payment {
            id: PaymentId(Uuid::new_v4()),
            customer_id: customer,
            date: new.date.unwrap_or_else(today),
            amount: new.amount,
            method: new.method,
            reference: new.reference,
        };
        self.store.insert_payment(payment.clone())?;

        match self.ledger().apply_payment(customer, payment.amount) {
            Ok(due) => {
                info!(%customer, payment = %payment.id.0, amount = %payment.amount, %due, "payment recorded");
                Ok(RecordedPayment { payment, due })
            }
            Err(e) => {
                warn!(%customer, error = %e, "payment failed, withdrawing record");
                if let Err(undo) = self.store.remove_payment(payment.id) {
                    warn!(%customer, error = %undo, "could not withdraw payment");
                }
                Err(e)
            }
        }
    }

    pub fn month_statement(&self, customer: CustomerId, month: Option<Month>) -> Result<MonthStatement> {
        let month = month.unwrap_or_else(Month::current);
        let (entries, payments) = PeriodAggregator::new(&self.store).records(customer, month)?;
        let summary = summarize(&entries, &payments)?;
        Ok(MonthStatement {
            month,
            entries,
            payments,
            total_charges: summary.total_charges,
            total_paid: summary.total_paid,
            period_due: summary.period_due,
        })
    }

    /// Build the invoice document for one customer and month. Fails before
    /// any aggregation when the customer does not exist.
    pub fn monthly_invoice(&self, customer: CustomerId, month: Month) -> Result<InvoiceDocument> {
        let customer = self.customer(customer)?;
        let summary = PeriodAggregator::new(&self.store).aggregate(customer.id, month)?;
        let doc = InvoiceAssembler::new(&self.dairy, &self.invoice)
            .assemble(&customer, month, &summary, today());
        info!(customer = %customer.id, %month, total = %doc.summary.total, "invoice assembled");
        Ok(doc)
    }

    /// One reminder per customer with the month's bill and period due.
    pub fn reminders(&self, month: Month) -> Result<Vec<Reminder>> {
        let aggregator = PeriodAggregator::new(&self.store);
        self.store
            .customers()?
            .into_iter()
            .map(|customer| {
                let summary = aggregator.aggregate(customer.id, month)?;
                Ok(Reminder::new(
                    &customer,
                    month,
                    &summary,
                    &self.notify.base_url,
                ))
            })
            .collect()
    }

    pub fn invoice_settings(&self) -> &InvoiceSettings {
        &self.invoice
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
