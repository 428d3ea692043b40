use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::RecordStore;
use crate::error::{DairyError, Result};
use crate::model::{Customer, CustomerId, Entry, EntryId, Payment, PaymentId};

/// Every record held by a store, in insertion order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

/// In-process record store.
///
/// Each customer sits behind its own mutex: balance updates for one
/// customer run one at a time, updates for different customers do not
/// wait on each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<IndexMap<CustomerId, Arc<Mutex<Customer>>>>,
    entries: RwLock<Vec<Entry>>,
    payments: RwLock<Vec<Payment>>,
}

fn poisoned<T>(_: T) -> DairyError {
    DairyError::StoreUnavailable("lock poisoned".to_string())
}

fn lock_customer(cell: &Mutex<Customer>) -> Result<MutexGuard<'_, Customer>> {
    cell.lock().map_err(poisoned)
}

fn in_window(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    date >= start && date < end
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let customers = snapshot
            .customers
            .into_iter()
            .map(|c| (c.id, Arc::new(Mutex::new(c))))
            .collect();
        Self {
            customers: RwLock::new(customers),
            entries: RwLock::new(snapshot.entries),
            payments: RwLock::new(snapshot.payments),
        }
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            customers: self.customers()?,
            entries: self.entries.read().map_err(poisoned)?.clone(),
            payments: self.payments.read().map_err(poisoned)?.clone(),
        })
    }

    fn customer_cell(&self, id: CustomerId) -> Result<Arc<Mutex<Customer>>> {
        self.customers
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| DairyError::CustomerNotFound(id.to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn insert_customer(&self, customer: Customer) -> Result<()> {
        let mut customers = self.customers.write().map_err(poisoned)?;
        for cell in customers.values() {
            if lock_customer(cell)?.phone == customer.phone {
                return Err(DairyError::DuplicatePhone(customer.phone));
            }
        }
        customers.insert(customer.id, Arc::new(Mutex::new(customer)));
        Ok(())
    }

    fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let customers = self.customers.read().map_err(poisoned)?;
        let found = match customers.get(&id) {
            Some(cell) => Some(lock_customer(cell)?.clone()),
            None => None,
        };
        Ok(found)
    }

    fn customers(&self) -> Result<Vec<Customer>> {
        let customers = self.customers.read().map_err(poisoned)?;
        let all = customers
            .values()
            .map(|cell| lock_customer(cell).map(|c| c.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(all)
    }

    fn insert_entry(&self, entry: Entry) -> Result<()> {
        self.entries.write().map_err(poisoned)?.push(entry);
        Ok(())
    }

    fn remove_entry(&self, id: EntryId) -> Result<()> {
        self.entries.write().map_err(poisoned)?.retain(|e| e.id != id);
        Ok(())
    }

    fn insert_payment(&self, payment: Payment) -> Result<()> {
        self.payments.write().map_err(poisoned)?.push(payment);
        Ok(())
    }

    fn remove_payment(&self, id: PaymentId) -> Result<()> {
        self.payments.write().map_err(poisoned)?.retain(|p| p.id != id);
        Ok(())
    }

    fn entries_between(
        &self,
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>> {
        let mut found: Vec<Entry> = self
            .entries
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|e| e.customer_id == customer && in_window(e.date, start, end))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.date);
        Ok(found)
    }

    fn payments_between(
        &self,
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Payment>> {
        let mut found: Vec<Payment> = self
            .payments
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|p| p.customer_id == customer && in_window(p.date, start, end))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.date);
        Ok(found)
    }

    fn update_due(
        &self,
        id: CustomerId,
        apply: &dyn Fn(Decimal) -> Result<Decimal>,
    ) -> Result<Decimal> {
        let cell = self.customer_cell(id)?;
        let mut customer = lock_customer(&cell)?;
        customer.due = apply(customer.due)?;
        Ok(customer.due)
    }
}
