mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryStore, Snapshot};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{Customer, CustomerId, Entry, EntryId, Payment, PaymentId};

/// Persistent records of customers, deliveries and payments.
///
/// Range queries take a half-open `[start, end)` date window and return
/// records in ascending date order; records sharing a date keep the order
/// they were inserted in.
pub trait RecordStore: Send + Sync {
    fn insert_customer(&self, customer: Customer) -> Result<()>;

    fn customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    fn customers(&self) -> Result<Vec<Customer>>;

    fn insert_entry(&self, entry: Entry) -> Result<()>;

    fn remove_entry(&self, id: EntryId) -> Result<()>;

    fn insert_payment(&self, payment: Payment) -> Result<()>;

    fn remove_payment(&self, id: PaymentId) -> Result<()>;

    fn entries_between(
        &self,
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>>;

    fn payments_between(
        &self,
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Payment>>;

    /// Replace a customer's `due` with `apply(due)` as one step that no
    /// other update of the same customer can interleave with. Returns the
    /// new balance. When `apply` fails the balance is left as it was.
    fn update_due(
        &self,
        id: CustomerId,
        apply: &dyn Fn(Decimal) -> Result<Decimal>,
    ) -> Result<Decimal>;
}
